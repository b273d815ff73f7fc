// src/sys/dispatch.rs

use crate::error::TransportError;
use crate::sys::secrets::CommandString;
use crate::sys::traits::AgentChannel;

/// Sends `command` over `channel` exactly once and reports the outcome as-is.
///
/// No retry: repeating a passphrase-cache command is not harmless the way an
/// idempotent read would be. The command is consumed and wiped before this
/// returns, whatever the outcome.
pub async fn dispatch(
    channel: &mut dyn AgentChannel,
    command: CommandString,
) -> Result<(), TransportError> {
    let verb = command.verb().to_owned();
    tracing::debug!(verb = %verb, "sending request to agent");

    let result = channel.transact(command.as_bytes()).await;
    drop(command);

    match &result {
        Ok(()) => tracing::debug!(verb = %verb, "agent accepted request"),
        Err(e) => tracing::debug!(verb = %verb, error = %e, "agent request failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::encode::{encode_forget, encode_preset};
    use crate::sys::secrets::SecretBytes;
    use crate::sys::secrets::recorder::{self, WipeEvent};
    use crate::sys::testing::{FakeChannel, Outcome};

    fn preset_command() -> CommandString {
        let secret = SecretBytes::copy_from(b"hunter2").unwrap();
        let command = encode_preset(secret, "ABCD1234", false).unwrap();
        recorder::take();
        command
    }

    #[tokio::test]
    async fn sends_line_unmodified_and_wipes_it() {
        let mut channel = FakeChannel::new(vec![Outcome::Ok]);
        dispatch(&mut channel, preset_command()).await.unwrap();

        assert_eq!(channel.sent(), vec![b"PRESET_PASSPHRASE ABCD1234 -1 68756e74657232\n".to_vec()]);
        assert_eq!(
            recorder::take(),
            vec![WipeEvent { label: "command", len: 45, zeroed: true }]
        );
    }

    #[tokio::test]
    async fn channel_fault_is_reported_and_command_still_wiped() {
        let mut channel = FakeChannel::new(vec![Outcome::ChannelFailure]);
        let err = dispatch(&mut channel, preset_command()).await.unwrap_err();

        assert!(matches!(err, TransportError::ChannelFailure(_)));
        assert_eq!(recorder::take_labels(), vec!["command"]);
    }

    #[tokio::test]
    async fn agent_rejection_carries_code_and_reason() {
        let mut channel = FakeChannel::new(vec![Outcome::Rejected(67108924, "Not supported")]);
        let err = dispatch(&mut channel, encode_forget("ABCD1234").unwrap())
            .await
            .unwrap_err();

        match err {
            TransportError::AgentRejected { code, reason } => {
                assert_eq!(code, 67108924);
                assert_eq!(reason, "Not supported");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(recorder::take_labels(), vec!["command"]);
    }

    #[tokio::test]
    async fn single_attempt_only() {
        let mut channel = FakeChannel::new(vec![Outcome::ChannelFailure, Outcome::Ok]);
        assert!(dispatch(&mut channel, preset_command()).await.is_err());
        assert_eq!(channel.sent().len(), 1);
    }
}
