//! In-memory [`PlatformClient`] for tests.
//!
//! [`RecordingClient`] never talks to a network. It stores every call so a
//! test can assert on what the dispatch core sent out, and can be told to
//! fail the next command sync.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::foundation::InteractionMeta;
use crate::integration::{BoxedClient, Choice, CommandSchema, PlatformClient, Reply, SyncTarget};

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Sync {
        target: SyncTarget,
        commands: Vec<CommandSchema>,
    },
    Autocomplete {
        meta: InteractionMeta,
        choices: Vec<Choice>,
    },
    Respond {
        meta: InteractionMeta,
        reply: Reply,
    },
}

/// A [`PlatformClient`] that records calls instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
    fail_sync: Mutex<Option<ClientError>>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns `self` as a [`BoxedClient`].
    pub fn boxed(self: &Arc<Self>) -> BoxedClient {
        Arc::clone(self) as BoxedClient
    }

    /// Makes the next `bulk_overwrite_commands` call fail with `error`.
    pub fn fail_next_sync(&self, error: ClientError) {
        *self.fail_sync.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Every successful command sync, in order.
    pub fn syncs(&self) -> Vec<(SyncTarget, Vec<CommandSchema>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Sync { target, commands } => Some((*target, commands.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every autocomplete answer, in order.
    pub fn suggestions(&self) -> Vec<Vec<Choice>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Autocomplete { choices, .. } => Some(choices.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every reply text, in order.
    pub fn replies(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Respond { reply, .. } => Some(reply.content.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PlatformClient for RecordingClient {
    async fn bulk_overwrite_commands(
        &self,
        target: SyncTarget,
        commands: Vec<CommandSchema>,
    ) -> ClientResult<()> {
        if let Some(error) = self.fail_sync.lock().take() {
            return Err(error);
        }
        self.calls
            .lock()
            .push(RecordedCall::Sync { target, commands });
        Ok(())
    }

    async fn autocomplete_result(
        &self,
        interaction: &InteractionMeta,
        choices: Vec<Choice>,
    ) -> ClientResult<()> {
        self.calls.lock().push(RecordedCall::Autocomplete {
            meta: interaction.clone(),
            choices,
        });
        Ok(())
    }

    async fn respond(&self, interaction: &InteractionMeta, reply: Reply) -> ClientResult<()> {
        self.calls.lock().push(RecordedCall::Respond {
            meta: interaction.clone(),
            reply,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{InteractionId, InteractionToken, UserId};

    #[tokio::test]
    async fn test_records_in_order() {
        let client = RecordingClient::new();
        let meta = InteractionMeta::new(InteractionId(1), InteractionToken::new("t"), UserId(1));

        client.respond(&meta, Reply::new("hi")).await.unwrap();
        client
            .autocomplete_result(&meta, vec![Choice::new("a", "a")])
            .await
            .unwrap();

        assert_eq!(client.replies(), vec!["hi".to_string()]);
        assert_eq!(client.suggestions().len(), 1);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_next_sync_is_one_shot() {
        let client = RecordingClient::new();
        client.fail_next_sync(ClientError::TokenExpired);

        let first = client
            .bulk_overwrite_commands(SyncTarget::Global, Vec::new())
            .await;
        assert!(matches!(first, Err(ClientError::TokenExpired)));

        client
            .bulk_overwrite_commands(SyncTarget::Global, Vec::new())
            .await
            .unwrap();
        assert_eq!(client.syncs().len(), 1);
    }
}
