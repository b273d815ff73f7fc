use async_trait::async_trait;

use crate::error::TransportError;

// ==============================================================================
// Agent Control Channel
// ==============================================================================

/// A connected, line-oriented request/response channel to the agent.
#[async_trait]
pub trait AgentChannel: Send {
    /// Sends one newline-terminated request line exactly as given and waits
    /// for the agent's final verdict.
    ///
    /// 🛡️ Implementations must not copy `line` into buffers of their own: a
    /// PRESET line carries the hex passphrase and only the caller's buffer is
    /// wiped afterwards.
    async fn transact(&mut self, line: &[u8]) -> Result<(), TransportError>;
}
