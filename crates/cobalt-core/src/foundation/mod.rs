//! Foundation layer - the platform model the dispatch core works on.
//!
//! - Typed snowflake identifiers
//! - Channel kinds
//! - Inbound interactions and option values
//! - Generic platform events and their family table

pub mod channel;
pub mod event;
pub mod id;
pub mod interaction;

pub use channel::ChannelType;
pub use event::{EventFamily, EventKind, EventTag, MessageDeleted, PlatformEvent};
pub use id::{AttachmentId, ChannelId, GroupId, InteractionId, MessageId, RoleId, UserId};
pub use interaction::{
    Attachment, AutocompleteInteraction, ChannelRef, CommandInteraction,
    CommandPath, ComponentInteraction, ComponentKind, FocusedOption, Inbound, Interaction,
    InteractionMeta, InteractionToken, MessageCommandInteraction, ModalField, OptionValue,
    RawOption, TargetMessage, UserCommandInteraction, UserRef,
};
