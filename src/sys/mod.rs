// 🛡️ Zero-Trust Architecture: the secret only ever lives in `secrets` types.

pub mod traits;     // Agent channel contract
pub mod secrets;    // Memory hygiene (SecretBytes, CommandString)
pub mod acquire;    // Passphrase input
pub mod encode;     // Protocol line formatting
pub mod dispatch;   // Single-shot send
pub mod assuan;     // Unix socket transport

#[cfg(test)]
pub mod testing;    // Scripted in-memory channel
