// src/sys/testing.rs

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::sys::traits::AgentChannel;

/// Scripted verdict for one `transact` call.
pub enum Outcome {
    Ok,
    ChannelFailure,
    Rejected(u32, &'static str),
}

/// In-memory agent channel that records every line it is given.
pub struct FakeChannel {
    outcomes: VecDeque<Outcome>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl FakeChannel {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
            sent: Arc::default(),
        }
    }

    /// Shared view of the sent lines that stays valid after the channel is
    /// boxed and handed away.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.sent)
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentChannel for FakeChannel {
    async fn transact(&mut self, line: &[u8]) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(line.to_vec());
        match self.outcomes.pop_front().unwrap_or(Outcome::Ok) {
            Outcome::Ok => Ok(()),
            Outcome::ChannelFailure => Err(TransportError::ChannelFailure(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "agent went away",
            ))),
            Outcome::Rejected(code, reason) => Err(TransportError::AgentRejected {
                code,
                reason: reason.to_string(),
            }),
        }
    }
}
