// src/error.rs

use std::collections::TryReserveError;
use std::io;

/// Failure while obtaining the passphrase.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("{0}")]
    IoFailure(#[source] io::Error),
}

/// Failure while turning the passphrase into a protocol line.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("out of memory while building the agent command")]
    AllocationFailure,
}

impl From<TryReserveError> for EncodeError {
    fn from(_: TryReserveError) -> Self {
        Self::AllocationFailure
    }
}

/// Failure while talking to the agent. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("agent channel failure: {0}")]
    ChannelFailure(#[from] io::Error),

    /// The agent answered `ERR <code> <reason>`. `code` is a libgpg-error
    /// value: error source in bits 24..31, error code in bits 0..15.
    #[error(
        "agent rejected the request: {reason} (source {}, code {})",
        error_source(.code),
        error_code(.code)
    )]
    AgentRejected { code: u32, reason: String },
}

fn error_source(code: &u32) -> u32 {
    (code >> 24) & 0x7f
}

fn error_code(code: &u32) -> u32 {
    code & 0xffff
}

/// Top-level failure, one variant per phase so the operator can tell where
/// the invocation stopped.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("can't connect to the agent: {0}")]
    Connect(#[source] TransportError),

    #[error("reading passphrase failed: {0}")]
    ReadPassphrase(#[from] AcquireError),

    #[error("can't encode the agent command: {0}")]
    Encode(#[from] EncodeError),

    #[error("caching passphrase failed: {0}")]
    Cache(#[source] TransportError),

    #[error("clearing passphrase failed: {0}")]
    Clear(#[source] TransportError),
}
