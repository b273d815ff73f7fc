// src/sys/secrets.rs

use std::collections::TryReserveError;
use std::fmt;
use zeroize::Zeroize;

/// Largest passphrase read from the input stream in one go. Anything past
/// this is left unread.
pub const MAX_PASSPHRASE_LEN: usize = 499;

/// Overwrites `buf` with zeros, initialised bytes and spare capacity alike.
///
/// `zeroize` writes through volatile stores followed by a compiler fence, so
/// the wipe survives even though the allocation is freed right after.
#[cfg_attr(not(test), allow(unused_variables))]
fn wipe(label: &'static str, buf: &mut Vec<u8>) {
    buf.as_mut_slice().zeroize();
    #[cfg(test)]
    recorder::record(label, buf, buf.capacity());
    buf.zeroize();
}

/// Heap buffer for passphrase material. Allocated once at its final size and
/// never grown, so no stale copy is left behind by a reallocation; wiped when
/// dropped on every path, including `?` returns and unwinding.
///
/// `len` is the visible length. Bytes past it stay inside `bytes` and are
/// zero, so the wipe always covers the full allocation.
pub(crate) struct SecretBuf {
    label: &'static str,
    bytes: Vec<u8>,
    len: usize,
}

impl SecretBuf {
    pub(crate) fn with_capacity(label: &'static str, capacity: usize) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity)?;
        Ok(Self { label, bytes, len: 0 })
    }

    pub(crate) fn zeroed(label: &'static str, len: usize) -> Result<Self, TryReserveError> {
        let mut buf = Self::with_capacity(label, len)?;
        buf.bytes.resize(len, 0);
        buf.len = len;
        Ok(buf)
    }

    /// Appends each part in order. Callers size the buffer up front.
    pub(crate) fn extend_from_slices(&mut self, parts: &[&[u8]]) {
        for part in parts {
            debug_assert!(self.bytes.len() + part.len() <= self.bytes.capacity());
            self.bytes.extend_from_slice(part);
        }
        self.len = self.bytes.len();
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Shrinks the visible length and zeroes the bytes cut off, right away.
    pub(crate) fn truncate(&mut self, len: usize) {
        let len = len.min(self.len);
        self.bytes[len..self.len].zeroize();
        self.len = len;
    }

    /// The whole allocation, visible or not.
    #[cfg(test)]
    pub(crate) fn allocation(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SecretBuf {
    fn drop(&mut self) {
        wipe(self.label, &mut self.bytes);
    }
}

/// Raw passphrase bytes, either read from the input stream or copied from a
/// value supplied on the command line.
///
/// 1. It cannot be accidentally logged (`{:?}` prints `[REDACTED]`).
/// 2. When it goes out of scope the whole allocation is zeroized.
pub struct SecretBytes {
    buf: SecretBuf,
}

impl SecretBytes {
    /// Copies `src` into a fresh buffer sized exactly to it.
    pub fn copy_from(src: &[u8]) -> Result<Self, TryReserveError> {
        let mut buf = SecretBuf::with_capacity("secret", src.len())?;
        buf.extend_from_slices(&[src]);
        Ok(Self { buf })
    }

    /// A zero-filled buffer of `MAX_PASSPHRASE_LEN` bytes for a single read.
    pub(crate) fn read_buffer() -> Result<Self, TryReserveError> {
        Ok(Self {
            buf: SecretBuf::zeroed("secret", MAX_PASSPHRASE_LEN)?,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        self.buf.as_mut_slice()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    #[cfg(test)]
    pub(crate) fn allocation(&self) -> &[u8] {
        self.buf.allocation()
    }

    /// Exposes the plaintext to `action` only. The borrow cannot outlive the
    /// call, so the slice never escapes into longer-lived state.
    pub fn use_secret<F, R>(&self, action: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        action(self.buf.as_slice())
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBytes([REDACTED])")
    }
}

/// One fully formatted, newline-terminated protocol line. A PRESET line
/// carries the hex passphrase, so the buffer is wiped on drop like any other
/// secret.
pub struct CommandString {
    buf: SecretBuf,
}

impl CommandString {
    pub(crate) fn new(buf: SecretBuf) -> Self {
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// The command name, the only part that is safe to log.
    pub fn verb(&self) -> &str {
        let bytes = self.as_bytes();
        let end = bytes
            .iter()
            .position(|b| *b == b' ' || *b == b'\n')
            .unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..end]).unwrap_or("?")
    }
}

impl fmt::Debug for CommandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandString({} [REDACTED])", self.verb())
    }
}
