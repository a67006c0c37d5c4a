//! # Cobalt
//!
//! Typed slash commands, message components and gateway events for chat
//! platform bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  Inbound  ┌────────────┐──▶ CommandRegistry ──▶ slash / user / message handlers
//! │ Connector │─────────▶│ Dispatcher │──▶ ComponentRouter ──▶ button / select / modal handlers
//! └───────────┘           └────────────┘──▶ EventDispatcher ──▶ event subscribers
//!       ▲                       │
//!       └──── PlatformClient ◀──┘ replies, autocomplete, command sync
//! ```
//!
//! - **core**: platform value types and the [`PlatformClient`](core::PlatformClient) boundary
//! - **framework**: argument derivation, routing, worker pool, schema sync
//! - **runtime**: configuration, logging, launcher flags, event loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cobalt::prelude::*;
//!
//! #[derive(CommandArgs)]
//! struct Roll {
//!     #[arg(description = "Number of sides", default = "6")]
//!     sides: i64,
//! }
//!
//! async fn roll(_ctx: SlashContext, args: Roll) -> String {
//!     format!("You rolled {}", fastrand::i64(1..=args.sides))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut commands = CommandRegistry::new();
//!     commands.register(SlashCommand::new("roll", "Roll a die").handler(roll))?;
//!
//!     let dispatcher = Dispatcher::new(commands, ComponentRouter::new(), EventDispatcher::new());
//!     let runtime = CobaltRuntime::new(dispatcher);
//!     runtime.launch(&LaunchArgs::from_env(), &MyConnector::default()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: read `cobalt.toml` (default)
//! - `json-log`: JSON log lines

#[cfg(test)]
extern crate self as cobalt;

pub use cobalt_core as core;
pub use cobalt_framework as framework;
pub use cobalt_macros::{ChoiceEnum, CommandArgs};
pub use cobalt_runtime as runtime;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use cobalt::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use cobalt_runtime::{
        CobaltConfig, CobaltRuntime, Connection, LaunchArgs, PlatformConnector, ShardRange,
        Sharding,
    };

    // Declarations
    pub use cobalt_framework::{
        CommandRegistry, ComponentRouter, Dispatcher, EventDispatcher, MessageCommand,
        SlashCommand, SubcommandGroup, UserCommand, WorkerPool,
    };

    // Handler contexts
    pub use cobalt_framework::{
        AutocompleteContext, ComponentContext, EventContext, MessageContext, SlashContext,
        UserContext,
    };

    // Arguments: traits and their derives share a name
    pub use cobalt_framework::args::{
        AudioChannel, GuildChannel, MessageChannel, NewsChannel, StageChannel, TextChannel,
        ThreadChannel, VoiceChannel,
    };
    pub use cobalt_framework::{ArgValue, ChoiceEnum, CommandArgs};
    pub use cobalt_macros::{ChoiceEnum, CommandArgs};

    // Platform types
    pub use cobalt_core::{
        Attachment, BoxedClient, ChannelType, Choice, EventFamily, EventKind, GroupId,
        PlatformClient, Reply, RoleId, SyncTarget, UserId, UserRef,
    };
}

#[cfg(test)]
mod tests {
    use crate::core::testing::RecordingClient;
    use crate::core::{
        CommandInteraction, CommandPath, Inbound, Interaction, InteractionId, InteractionMeta,
        InteractionToken, OptionKind, OptionValue, RawOption,
    };
    use crate::framework::Dispatched;
    use crate::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, ChoiceEnum)]
    enum Unit {
        Celsius,
        #[choice(label = "Fahrenheit (US)", value = "f")]
        Fahrenheit,
    }

    #[derive(Debug, PartialEq, CommandArgs)]
    struct Convert {
        #[arg(description = "Temperature to convert")]
        value: f64,
        #[arg(description = "Unit of the given value")]
        from: Unit,
        #[arg(description = "Decimal places", default = "1")]
        precision: i64,
    }

    async fn convert(_ctx: SlashContext, args: Convert) -> String {
        let converted = match args.from {
            Unit::Celsius => args.value * 9.0 / 5.0 + 32.0,
            Unit::Fahrenheit => (args.value - 32.0) * 5.0 / 9.0,
        };
        format!("{converted:.*}", args.precision as usize)
    }

    fn dispatcher() -> Dispatcher {
        let mut commands = CommandRegistry::new();
        commands
            .register(SlashCommand::new("convert", "Convert temperatures").handler(convert))
            .unwrap();
        Dispatcher::new(commands, ComponentRouter::new(), EventDispatcher::new())
    }

    fn invoke(options: Vec<RawOption>) -> Inbound {
        Interaction::Command(CommandInteraction {
            meta: InteractionMeta::new(InteractionId(1), InteractionToken::new("t"), UserId(5)),
            path: CommandPath::new("convert"),
            options,
        })
        .into()
    }

    #[tokio::test]
    async fn test_derived_command_end_to_end() {
        let client = RecordingClient::new();
        let outcome = dispatcher()
            .dispatch(
                invoke(vec![
                    RawOption::new("value", OptionValue::Number(212.0)),
                    RawOption::new("from", OptionValue::String("f".into())),
                ]),
                client.boxed(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, Dispatched::Handled);
        assert_eq!(client.replies(), vec!["100.0".to_string()]);
    }

    #[test]
    fn test_published_schema() {
        let commands = dispatcher().synchronizer().commands().to_vec();
        assert_eq!(commands.len(), 1);

        let options = &commands[0].options;
        let names: Vec<_> = options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["value", "from", "precision"]);
        assert_eq!(options[0].kind, OptionKind::Number);
        assert!(options[0].required);
        assert!(!options[2].required);

        let labels: Vec<_> = options[1].choices.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(labels, ["Celsius", "Fahrenheit (US)"]);
    }
}
