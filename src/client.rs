// src/client.rs

use std::io::Read;

use crate::config::{ClientConfig, Operation};
use crate::error::ClientError;
use crate::sys::acquire::acquire_secret;
use crate::sys::dispatch::dispatch;
use crate::sys::encode::{encode_forget, encode_preset};
use crate::sys::traits::AgentChannel;

/// Runs one cache maintenance request against a connected agent.
pub struct PassphraseClient {
    config: ClientConfig,
    channel: Box<dyn AgentChannel>,
}

impl PassphraseClient {
    pub fn new(config: ClientConfig, channel: Box<dyn AgentChannel>) -> Self {
        Self { config, channel }
    }

    /// Performs the configured operation. `input` is only read for a PRESET
    /// without a passphrase on the command line.
    pub async fn run<R: Read>(&mut self, input: &mut R) -> Result<(), ClientError> {
        let keygrip = self.config.keygrip.clone();
        match self.config.operation {
            Operation::Preset => self.preset(&keygrip, input).await,
            Operation::Forget => self.forget(&keygrip).await,
        }
    }

    pub async fn preset<R: Read>(&mut self, keygrip: &str, input: &mut R) -> Result<(), ClientError> {
        let secret = acquire_secret(self.config.passphrase.as_ref(), input)?;
        let command = encode_preset(secret, keygrip, self.config.restricted)?;

        dispatch(self.channel.as_mut(), command)
            .await
            .map_err(ClientError::Cache)?;

        tracing::info!(keygrip, restricted = self.config.restricted, "passphrase cached");
        Ok(())
    }

    pub async fn forget(&mut self, keygrip: &str) -> Result<(), ClientError> {
        let command = encode_forget(keygrip)?;

        dispatch(self.channel.as_mut(), command)
            .await
            .map_err(ClientError::Clear)?;

        tracing::info!(keygrip, "passphrase cleared");
        Ok(())
    }
}
