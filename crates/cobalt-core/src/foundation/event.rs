//! Generic platform events.
//!
//! Events form a closed set of [`EventKind`]s. Related kinds are grouped into
//! [`EventFamily`]s through a static table, so a subscriber can listen either
//! to one concrete kind or to a whole family (the equivalent of subscribing to
//! a supertype):
//!
//! ```text
//! Any
//! ├── Message    (MessageCreate, MessageUpdate, MessageDelete, MessageBulkDelete)
//! ├── Reaction   (ReactionAdd, ReactionRemove, ReactionClear)
//! ├── Member     (MemberJoin, MemberUpdate, MemberLeave)
//! ├── Guild      (GuildCreate, GuildUpdate, GuildDelete)
//! ├── Channel    (ChannelCreate, ChannelUpdate, ChannelDelete)
//! ├── Role       (RoleCreate, RoleUpdate, RoleDelete)
//! └── Lifecycle  (Ready, Resumed, Shutdown)
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::{ChannelId, GroupId, MessageId};

/// A concrete platform event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    MessageCreate,
    MessageUpdate,
    MessageDelete,
    MessageBulkDelete,
    ReactionAdd,
    ReactionRemove,
    ReactionClear,
    MemberJoin,
    MemberUpdate,
    MemberLeave,
    GuildCreate,
    GuildUpdate,
    GuildDelete,
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,
    RoleCreate,
    RoleUpdate,
    RoleDelete,
    Ready,
    Resumed,
    Shutdown,
}

/// A group of related event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFamily {
    /// Every event.
    Any,
    Message,
    Reaction,
    Member,
    Guild,
    Channel,
    Role,
    Lifecycle,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: &'static [EventKind] = &[
        EventKind::MessageCreate,
        EventKind::MessageUpdate,
        EventKind::MessageDelete,
        EventKind::MessageBulkDelete,
        EventKind::ReactionAdd,
        EventKind::ReactionRemove,
        EventKind::ReactionClear,
        EventKind::MemberJoin,
        EventKind::MemberUpdate,
        EventKind::MemberLeave,
        EventKind::GuildCreate,
        EventKind::GuildUpdate,
        EventKind::GuildDelete,
        EventKind::ChannelCreate,
        EventKind::ChannelUpdate,
        EventKind::ChannelDelete,
        EventKind::RoleCreate,
        EventKind::RoleUpdate,
        EventKind::RoleDelete,
        EventKind::Ready,
        EventKind::Resumed,
        EventKind::Shutdown,
    ];

    /// The families this kind belongs to. Every kind is in [`EventFamily::Any`].
    pub const fn families(self) -> &'static [EventFamily] {
        use EventFamily as F;
        match self {
            Self::MessageCreate
            | Self::MessageUpdate
            | Self::MessageDelete
            | Self::MessageBulkDelete => &[F::Any, F::Message],
            Self::ReactionAdd | Self::ReactionRemove | Self::ReactionClear => {
                &[F::Any, F::Reaction]
            }
            Self::MemberJoin | Self::MemberUpdate | Self::MemberLeave => &[F::Any, F::Member],
            Self::GuildCreate | Self::GuildUpdate | Self::GuildDelete => &[F::Any, F::Guild],
            Self::ChannelCreate | Self::ChannelUpdate | Self::ChannelDelete => {
                &[F::Any, F::Channel]
            }
            Self::RoleCreate | Self::RoleUpdate | Self::RoleDelete => &[F::Any, F::Role],
            Self::Ready | Self::Resumed | Self::Shutdown => &[F::Any, F::Lifecycle],
        }
    }

    /// Returns `true` if this kind is a member of `family`.
    pub fn is_in(self, family: EventFamily) -> bool {
        self.families().contains(&family)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageCreate => "message_create",
            Self::MessageUpdate => "message_update",
            Self::MessageDelete => "message_delete",
            Self::MessageBulkDelete => "message_bulk_delete",
            Self::ReactionAdd => "reaction_add",
            Self::ReactionRemove => "reaction_remove",
            Self::ReactionClear => "reaction_clear",
            Self::MemberJoin => "member_join",
            Self::MemberUpdate => "member_update",
            Self::MemberLeave => "member_leave",
            Self::GuildCreate => "guild_create",
            Self::GuildUpdate => "guild_update",
            Self::GuildDelete => "guild_delete",
            Self::ChannelCreate => "channel_create",
            Self::ChannelUpdate => "channel_update",
            Self::ChannelDelete => "channel_delete",
            Self::RoleCreate => "role_create",
            Self::RoleUpdate => "role_update",
            Self::RoleDelete => "role_delete",
            Self::Ready => "ready",
            Self::Resumed => "resumed",
            Self::Shutdown => "shutdown",
        }
    }
}

impl EventFamily {
    /// The kinds grouped under this family.
    pub fn members(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(move |kind| kind.is_in(self))
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a subscription listens to: one kind or a whole family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Kind(EventKind),
    Family(EventFamily),
}

impl EventTag {
    /// Expands the tag into the concrete kinds it covers.
    pub fn kinds(self) -> Vec<EventKind> {
        match self {
            Self::Kind(kind) => vec![kind],
            Self::Family(family) => family.members().collect(),
        }
    }
}

impl From<EventKind> for EventTag {
    fn from(kind: EventKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<EventFamily> for EventTag {
    fn from(family: EventFamily) -> Self {
        Self::Family(family)
    }
}

/// One event delivered by the platform.
///
/// The payload is kept as JSON and can be read into a typed struct with
/// [`payload_as`](Self::payload_as).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub kind: EventKind,
    /// The connection shard that delivered the event.
    #[serde(default)]
    pub shard: u32,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub payload: Value,
}

impl PlatformEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            kind,
            shard: 0,
            group_id: None,
            payload,
        }
    }

    pub fn on_shard(mut self, shard: u32) -> Self {
        self.shard = shard;
        self
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Deserializes the payload into `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.payload)
    }
}

/// Payload of [`EventKind::MessageDelete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleted {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}
