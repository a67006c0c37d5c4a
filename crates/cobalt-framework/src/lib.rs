//! # Cobalt Framework
//!
//! The dispatch core of Cobalt: declarations go in at setup time, inbound
//! interactions and events are routed to exactly one handler (or, for
//! events, to every subscriber) at run time.
//!
//! ```text
//!  setup                                   run time
//!  ─────                                   ────────
//!  SlashCommand / UserCommand ─┐
//!  ComponentRouter::button ... ├─▶ Dispatcher ◀── Inbound (from the platform client)
//!  EventDispatcher::on ────────┘        │
//!                                       ├─▶ handler(ctx, args)  inline or on the WorkerPool
//!  SchemaSynchronizer ─▶ PlatformClient::bulk_overwrite_commands
//! ```
//!
//! - [`args`]: argument declarations, the cached schema and typed decoding
//! - [`command`]: the command tree and its router
//! - [`component`]: longest-prefix routing for buttons, select menus and modals
//! - [`event`]: fan-out of platform events by kind and family
//! - [`sync`]: publishing the command set
//! - [`executor`]: the bounded worker pool for threaded commands
//! - [`dispatcher`]: the entry point tying the routers together

pub mod args;
pub mod command;
pub mod component;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod executor;
pub mod handler;
pub mod sync;

pub use args::{
    ArgBuilder, ArgValue, ArgsDeclaration, ArgumentDescriptor, ArgumentSchema, ChoiceArg,
    ChoiceEnum, CommandArgs, OptionReader, SemanticType,
};
pub use command::{
    CommandNode, CommandRegistry, GroupNode, MessageCommand, SlashCommand, SubcommandGroup,
    UserCommand,
};
pub use component::{ComponentRouter, PrefixTable};
pub use context::{
    AutocompleteContext, ComponentContext, EventContext, HandlerContext, MessageContext,
    SlashContext, UserContext,
};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{
    DeclarationError, DeclarationResult, DecodeError, DecodeResult, DispatchError, DispatchResult,
    SubmitError,
};
pub use event::EventDispatcher;
pub use executor::{PoolConfig, QueueFullPolicy, WorkerPool};
pub use handler::{
    AutocompleteProvider, BoxFuture, BoxedHandler, ErasedHandler, Handler, HandlerResponse,
    SlashHandler, into_handler,
};
pub use sync::SchemaSynchronizer;

/// Items used by generated code.
#[doc(hidden)]
pub mod __private {
    pub use cobalt_core::{Choice, OptionValue, RawOption};
}
