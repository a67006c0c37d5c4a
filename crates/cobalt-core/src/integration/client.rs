//! Outbound platform boundary.
//!
//! The gateway connection, REST transport and sharding all live behind the
//! [`PlatformClient`] trait. The dispatch core only needs three calls:
//! replacing the remote command set, answering autocomplete requests, and a
//! plain reply that handlers can use.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::schema::{Choice, CommandSchema, SyncTarget};
use crate::error::ClientResult;
use crate::foundation::InteractionMeta;

/// A simple text reply to an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content: String,
    /// Only the invoking user can see an ephemeral reply.
    #[serde(default)]
    pub ephemeral: bool,
}

impl Reply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

impl From<&str> for Reply {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Reply {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// The outbound half of a platform connection.
///
/// Implementations own transport, retries (if any) and rate limiting.
///
/// # Example
///
/// ```rust,ignore
/// struct RestClient { http: reqwest::Client, app_id: u64 }
///
/// #[async_trait]
/// impl PlatformClient for RestClient {
///     async fn bulk_overwrite_commands(
///         &self,
///         target: SyncTarget,
///         commands: Vec<CommandSchema>,
///     ) -> ClientResult<()> {
///         let url = match target {
///             SyncTarget::Global => format!("/applications/{}/commands", self.app_id),
///             SyncTarget::Group(g) => format!("/applications/{}/guilds/{g}/commands", self.app_id),
///         };
///         // PUT `commands` as JSON to `url`
///         # Ok(())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Replaces every remote command in `target` with `commands`.
    async fn bulk_overwrite_commands(
        &self,
        target: SyncTarget,
        commands: Vec<CommandSchema>,
    ) -> ClientResult<()>;

    /// Answers an autocomplete request with suggestions.
    async fn autocomplete_result(
        &self,
        interaction: &InteractionMeta,
        choices: Vec<Choice>,
    ) -> ClientResult<()>;

    /// Answers an interaction with a text reply.
    async fn respond(&self, interaction: &InteractionMeta, reply: Reply) -> ClientResult<()>;
}

/// A shared, type-erased platform client.
pub type BoxedClient = Arc<dyn PlatformClient>;
