//! Publishing the command set to the platform.
//!
//! The synchronizer flattens the registry into wire-format
//! [`CommandSchema`]s and replaces the remote command set for a
//! [`SyncTarget`] in one call. Commands that exist remotely but are no longer
//! registered locally disappear with that replace.

use tokio::task::JoinHandle;
use tracing::{error, info};

use cobalt_core::{BoxedClient, ClientResult, CommandSchema, OptionSchema, SyncTarget};

use crate::command::{CommandNode, CommandRegistry, GroupNode};

fn subcommand_schema(node: &CommandNode) -> OptionSchema {
    OptionSchema::subcommand(node.name(), node.description(), node.schema().to_options())
}

fn group_schema(group: &GroupNode) -> OptionSchema {
    OptionSchema::group(
        group.name(),
        group.description(),
        group.subcommands().iter().map(subcommand_schema).collect(),
    )
}

/// Wire schema of a top-level slash command: sub-commands, then groups, then
/// its own arguments.
pub fn command_schema(node: &CommandNode) -> CommandSchema {
    let options = node
        .subcommands()
        .iter()
        .map(subcommand_schema)
        .chain(node.groups().iter().map(group_schema))
        .chain(node.schema().to_options())
        .collect();
    CommandSchema::slash(node.name(), node.description(), options)
}

/// A snapshot of the registry in wire format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSynchronizer {
    commands: Vec<CommandSchema>,
}

impl SchemaSynchronizer {
    pub fn new(registry: &CommandRegistry) -> Self {
        Self {
            commands: Self::build(registry),
        }
    }

    /// Slash commands in registration order, then user commands, then
    /// message commands.
    pub fn build(registry: &CommandRegistry) -> Vec<CommandSchema> {
        registry
            .slash_commands()
            .map(command_schema)
            .chain(registry.user_commands().map(|c| CommandSchema::user(c.name())))
            .chain(
                registry
                    .message_commands()
                    .map(|c| CommandSchema::message(c.name())),
            )
            .collect()
    }

    pub fn commands(&self) -> &[CommandSchema] {
        &self.commands
    }

    /// Replaces the remote command set of `target`.
    ///
    /// Failures are logged and returned; nothing is retried.
    pub async fn sync(&self, client: &BoxedClient, target: SyncTarget) -> ClientResult<()> {
        let count = self.commands.len();
        match client
            .bulk_overwrite_commands(target, self.commands.clone())
            .await
        {
            Ok(()) => {
                info!(%target, count, "Synchronized commands");
                Ok(())
            }
            Err(e) => {
                error!(%target, "Failed to synchronize commands: {e}");
                Err(e)
            }
        }
    }

    /// Runs [`sync`](Self::sync) in the background.
    pub fn spawn_sync(&self, client: BoxedClient, target: SyncTarget) -> JoinHandle<ClientResult<()>> {
        let this = self.clone();
        tokio::spawn(async move { this.sync(&client, target).await })
    }
}
