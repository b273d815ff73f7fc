// src/sys/encode.rs

use crate::error::EncodeError;
use crate::sys::secrets::{CommandString, SecretBuf, SecretBytes};

const PRESET_VERB: &[u8] = b"PRESET_PASSPHRASE ";
const CLEAR_VERB: &[u8] = b"CLEAR_PASSPHRASE ";
const RESTRICTED_SCOPE: &[u8] = b"--restricted ";
// The agent reads `-1` as "no expiry".
const NO_TIMEOUT: &[u8] = b" -1 ";
const EOL: &[u8] = b"\n";

/// Builds `PRESET_PASSPHRASE [--restricted ]<keygrip> -1 <hex>\n`.
///
/// Takes the secret by value: the raw bytes are wiped as soon as the hex form
/// exists, and the hex form as soon as the line is built. Every early return
/// drops (and so wipes) whatever was allocated so far.
pub fn encode_preset(
    secret: SecretBytes,
    keygrip: &str,
    restricted: bool,
) -> Result<CommandString, EncodeError> {
    let hex = hex_encode(&secret)?;
    drop(secret);

    let scope: &[u8] = if restricted { RESTRICTED_SCOPE } else { b"" };
    let parts: [&[u8]; 6] = [
        PRESET_VERB,
        scope,
        keygrip.as_bytes(),
        NO_TIMEOUT,
        hex.as_slice(),
        EOL,
    ];
    let line = assemble(&parts)?;
    drop(hex);

    Ok(CommandString::new(line))
}

/// Builds `CLEAR_PASSPHRASE <keygrip>\n`.
pub fn encode_forget(keygrip: &str) -> Result<CommandString, EncodeError> {
    let line = assemble(&[CLEAR_VERB, keygrip.as_bytes(), EOL])?;
    Ok(CommandString::new(line))
}

/// Lowercase hex, two characters per byte, into a buffer allocated once.
fn hex_encode(secret: &SecretBytes) -> Result<SecretBuf, EncodeError> {
    let len = secret
        .len()
        .checked_mul(2)
        .ok_or(EncodeError::AllocationFailure)?;
    let mut out = SecretBuf::zeroed("hex", len)?;

    // encode_to_slice only fails on a length mismatch, which the sizing above rules out.
    secret
        .use_secret(|bytes| hex::encode_to_slice(bytes, out.as_mut_slice()))
        .map_err(|_| EncodeError::AllocationFailure)?;

    Ok(out)
}

fn assemble(parts: &[&[u8]]) -> Result<SecretBuf, EncodeError> {
    let len = parts
        .iter()
        .try_fold(0usize, |acc, part| acc.checked_add(part.len()))
        .ok_or(EncodeError::AllocationFailure)?;
    let mut line = SecretBuf::with_capacity("command", len)?;
    line.extend_from_slices(parts);
    Ok(line)
}
