// src/sys/acquire.rs

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::AsFd;

use secrecy::{ExposeSecret, SecretString};

use crate::error::AcquireError;
use crate::sys::secrets::SecretBytes;

/// Unbuffered reader over file descriptor 0.
///
/// `std::io::stdin()` reads through a process-wide buffer that is never
/// wiped. Reading a duplicate of the descriptor through a `File` issues a
/// plain `read(2)` straight into the caller's secret buffer instead.
pub struct RawStdin;

impl Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        File::from(fd).read(buf)
    }
}

/// Obtains the passphrase for a PRESET request.
///
/// A value given on the command line wins and `input` is never touched.
/// Otherwise exactly one `read` of at most `MAX_PASSPHRASE_LEN` bytes is
/// issued; longer input is truncated without complaint. One trailing `\n` or
/// `\r\n` is stripped; empty passphrases are passed through.
pub fn acquire_secret<R: Read>(
    preset_value: Option<&SecretString>,
    input: &mut R,
) -> Result<SecretBytes, AcquireError> {
    if let Some(value) = preset_value {
        return SecretBytes::copy_from(value.expose_secret().as_bytes())
            .map_err(|_| AcquireError::IoFailure(io::ErrorKind::OutOfMemory.into()));
    }

    let mut secret = SecretBytes::read_buffer()
        .map_err(|_| AcquireError::IoFailure(io::ErrorKind::OutOfMemory.into()))?;

    // 🛡️ On error `secret` is dropped here, and the partially filled buffer with it.
    let read = input.read(secret.as_mut_slice()).map_err(AcquireError::IoFailure)?;

    let len = secret.use_secret(|bytes| trimmed_len(&bytes[..read]));
    secret.truncate(len);
    tracing::debug!(bytes = len, "passphrase read from input");

    Ok(secret)
}

/// Length of `line` once a single trailing `\n` or `\r\n` is removed.
fn trimmed_len(line: &[u8]) -> usize {
    match line {
        [rest @ .., b'\r', b'\n'] => rest.len(),
        [rest @ .., b'\n'] => rest.len(),
        _ => line.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::secrets::MAX_PASSPHRASE_LEN;
    use crate::sys::secrets::recorder::{self, WipeEvent};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "stdin closed"))
        }
    }

    fn acquire_from(input: &[u8]) -> Vec<u8> {
        let mut reader = input;
        let secret = acquire_secret(None, &mut reader).unwrap();
        secret.use_secret(|bytes| bytes.to_vec())
    }

    #[test]
    fn preset_value_is_used_verbatim_without_reading() {
        let value = SecretString::new(" pass phrase\n".to_string());
        let secret = acquire_secret(Some(&value), &mut FailingReader).unwrap();
        secret.use_secret(|bytes| assert_eq!(bytes, b" pass phrase\n"));
    }

    #[test]
    fn strips_exactly_one_line_terminator() {
        assert_eq!(acquire_from(b"hunter2\n"), b"hunter2");
        assert_eq!(acquire_from(b"hunter2\r\n"), b"hunter2");
        assert_eq!(acquire_from(b"hunter2\n\n"), b"hunter2\n");
        assert_eq!(acquire_from(b"hunter2\r\n\r\n"), b"hunter2\r\n");
        assert_eq!(acquire_from(b"hunter2"), b"hunter2");
    }

    #[test]
    fn lone_carriage_return_and_control_bytes_are_kept() {
        assert_eq!(acquire_from(b"hunter2\r"), b"hunter2\r");
        assert_eq!(acquire_from(b"\t\x00a b\x1b\n"), b"\t\x00a b\x1b");
    }

    #[test]
    fn empty_passphrase_is_accepted() {
        assert_eq!(acquire_from(b""), b"");
        assert_eq!(acquire_from(b"\n"), b"");
        assert_eq!(acquire_from(b"\r\n"), b"");
    }

    #[test]
    fn long_input_is_truncated_silently() {
        let input = vec![b'x'; 600];
        let mut reader = &input[..];
        let secret = acquire_secret(None, &mut reader).unwrap();

        assert_eq!(secret.len(), MAX_PASSPHRASE_LEN);
        assert_eq!(reader.len(), 600 - MAX_PASSPHRASE_LEN);
    }

    #[test]
    fn only_one_read_is_issued() {
        let mut reader = (&b"hun"[..]).chain(&b"ter2\n"[..]);
        let secret = acquire_secret(None, &mut reader).unwrap();
        secret.use_secret(|bytes| assert_eq!(bytes, b"hun"));
    }

    #[test]
    fn trimmed_terminator_and_unused_tail_are_zero() {
        let mut reader = &b"hunter2\r\n"[..];
        let secret = acquire_secret(None, &mut reader).unwrap();

        let allocation = secret.allocation();
        assert_eq!(allocation.len(), MAX_PASSPHRASE_LEN);
        assert_eq!(&allocation[..7], b"hunter2");
        assert!(allocation[7..].iter().all(|b| *b == 0));

        recorder::take();
        drop(secret);
        assert_eq!(
            recorder::take(),
            vec![WipeEvent { label: "secret", len: MAX_PASSPHRASE_LEN, zeroed: true }]
        );
    }

    #[test]
    fn read_failure_wipes_the_buffer() {
        recorder::take();
        let err = acquire_secret(None, &mut FailingReader).unwrap_err();

        assert!(matches!(err, AcquireError::IoFailure(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
        assert_eq!(
            recorder::take(),
            vec![WipeEvent { label: "secret", len: MAX_PASSPHRASE_LEN, zeroed: true }]
        );
    }
}
