//! # Cobalt Core
//!
//! Platform model and outbound boundary for the Cobalt interaction framework.
//!
//! This crate holds the types every other Cobalt crate agrees on. It performs
//! no routing itself.
//!
//! ## Layers
//!
//! ### Foundation
//!
//! Value types delivered by the platform:
//! - **Identifiers**: [`UserId`], [`RoleId`], [`ChannelId`], [`GroupId`], ...
//! - **Interactions**: [`CommandInteraction`], [`AutocompleteInteraction`],
//!   [`UserCommandInteraction`], [`MessageCommandInteraction`],
//!   [`ComponentInteraction`], wrapped in [`Interaction`] and [`Inbound`]
//! - **Events**: [`PlatformEvent`] with its closed [`EventKind`] set and the
//!   [`EventFamily`] table
//!
//! ### Integration
//!
//! What goes back out:
//! - **Wire schemas**: [`CommandSchema`], [`OptionSchema`], [`Choice`]
//! - **Client boundary**: the [`PlatformClient`] trait
//!
//! ```text
//! ┌──────────────┐  Inbound   ┌────────────┐  handlers  ┌──────────┐
//! │ platform     │──────────▶│ Dispatcher │──────────▶│ user code │
//! │ connection   │◀──────────│  (cobalt)  │           └──────────┘
//! └──────────────┘  Platform  └────────────┘
//!                   Client
//! ```

pub mod error;
pub mod foundation;
pub mod integration;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{ClientError, ClientResult};

pub use foundation::{
    Attachment, AttachmentId, AutocompleteInteraction, ChannelId, ChannelRef,
    ChannelType, CommandInteraction, CommandPath, ComponentInteraction, ComponentKind, EventFamily,
    EventKind, EventTag, FocusedOption, GroupId, Inbound, Interaction, InteractionId,
    InteractionMeta, InteractionToken, MessageCommandInteraction, MessageDeleted, MessageId,
    ModalField, OptionValue, PlatformEvent, RawOption, RoleId, TargetMessage, UserCommandInteraction,
    UserId, UserRef,
};

pub use integration::{
    BoxedClient, Choice, ChoiceValue, CommandKind, CommandSchema, OptionKind, OptionSchema,
    PlatformClient, Reply, SyncTarget,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::integration::{
        BoxedClient, Choice, ChoiceValue, CommandSchema, PlatformClient, Reply, SyncTarget,
    };
}
