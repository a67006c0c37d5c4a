//! Inbound interaction model.
//!
//! The platform client translates gateway payloads into these types before
//! handing them to the dispatcher. Every interaction carries an
//! [`InteractionMeta`] with the data needed to answer it.
//!
//! ```text
//! Inbound
//! ├── Interaction
//! │   ├── Command       (slash invocation: name, group?, sub-command?, options)
//! │   ├── Autocomplete  (same path plus the focused option)
//! │   ├── User          (context action on a user)
//! │   ├── Message       (context action on a message)
//! │   └── Component     (button / select menu / modal submit)
//! └── Event             (generic platform event, see `event`)
//! ```

use serde::{Deserialize, Serialize};

use super::channel::ChannelType;
use super::event::PlatformEvent;
use super::id::{AttachmentId, ChannelId, GroupId, InteractionId, MessageId, RoleId, UserId};

/// Opaque continuation token used to answer an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionToken(String);

impl InteractionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Data shared by every interaction kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMeta {
    pub id: InteractionId,
    pub token: InteractionToken,
    /// The user who triggered the interaction.
    pub user: UserId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

impl InteractionMeta {
    pub fn new(id: InteractionId, token: InteractionToken, user: UserId) -> Self {
        Self {
            id,
            token,
            user,
            group_id: None,
            channel_id: None,
        }
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn in_channel(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = Some(channel_id);
        self
    }
}

// ============================================================================
// Option values
// ============================================================================

/// A user referenced by an option or a context action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    /// Set when the user was resolved as a member of the invoking group.
    #[serde(default)]
    pub member: bool,
}

/// A channel referenced by an option, with its resolved kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub kind: ChannelType,
}

/// An uploaded file referenced by an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub filename: String,
    pub url: String,
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A raw, already-resolved option value as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(UserRef),
    Role(RoleId),
    Channel(ChannelRef),
    Attachment(Attachment),
}

impl OptionValue {
    /// Short name of the value kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::User(_) => "user",
            Self::Role(_) => "role",
            Self::Channel(_) => "channel",
            Self::Attachment(_) => "attachment",
        }
    }
}

/// A named option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOption {
    pub name: String,
    pub value: OptionValue,
}

impl RawOption {
    pub fn new(name: impl Into<String>, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ============================================================================
// Interactions
// ============================================================================

/// The resolved name path of a slash invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPath {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub subcommand: Option<String>,
}

impl CommandPath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            subcommand: None,
        }
    }

    pub fn subcommand(mut self, name: impl Into<String>) -> Self {
        self.subcommand = Some(name.into());
        self
    }

    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.group = Some(name.into());
        self
    }
}

impl std::fmt::Display for CommandPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if let Some(group) = &self.group {
            write!(f, " {group}")?;
        }
        if let Some(sub) = &self.subcommand {
            write!(f, " {sub}")?;
        }
        Ok(())
    }
}

/// A slash-command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInteraction {
    pub meta: InteractionMeta,
    pub path: CommandPath,
    #[serde(default)]
    pub options: Vec<RawOption>,
}

/// The option the user is currently typing into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusedOption {
    pub name: String,
    /// The partial value typed so far.
    pub value: OptionValue,
}

/// A request for autocomplete suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteInteraction {
    pub meta: InteractionMeta,
    pub path: CommandPath,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub focused: FocusedOption,
}

/// A context-menu action invoked on a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCommandInteraction {
    pub meta: InteractionMeta,
    pub name: String,
    pub target: UserRef,
}

/// The message a message-context action was invoked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: UserId,
    pub content: String,
}

/// A context-menu action invoked on a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCommandInteraction {
    pub meta: InteractionMeta,
    pub name: String,
    pub target: TargetMessage,
}

/// The three component namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Button,
    SelectMenu,
    Modal,
}

impl ComponentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::SelectMenu => "select_menu",
            Self::Modal => "modal",
        }
    }
}

/// One text input submitted with a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalField {
    pub custom_id: String,
    pub value: String,
}

/// A button press, select-menu choice or modal submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInteraction {
    pub meta: InteractionMeta,
    pub kind: ComponentKind,
    /// The identifier chosen by the code that created the component.
    pub custom_id: String,
    /// Values picked in a select menu.
    #[serde(default)]
    pub values: Vec<String>,
    /// Inputs submitted with a modal.
    #[serde(default)]
    pub fields: Vec<ModalField>,
    /// The message the component is attached to, if any.
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

impl ComponentInteraction {
    pub fn new(meta: InteractionMeta, kind: ComponentKind, custom_id: impl Into<String>) -> Self {
        Self {
            meta,
            kind,
            custom_id: custom_id.into(),
            values: Vec::new(),
            fields: Vec::new(),
            message_id: None,
        }
    }

    /// Looks up a submitted modal input by its id.
    pub fn field(&self, custom_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.custom_id == custom_id)
            .map(|f| f.value.as_str())
    }
}

/// Any interaction the platform can deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    Command(CommandInteraction),
    Autocomplete(AutocompleteInteraction),
    User(UserCommandInteraction),
    Message(MessageCommandInteraction),
    Component(ComponentInteraction),
}

impl Interaction {
    pub fn meta(&self) -> &InteractionMeta {
        match self {
            Self::Command(i) => &i.meta,
            Self::Autocomplete(i) => &i.meta,
            Self::User(i) => &i.meta,
            Self::Message(i) => &i.meta,
            Self::Component(i) => &i.meta,
        }
    }

    /// Short name of the interaction kind, for spans and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Autocomplete(_) => "autocomplete",
            Self::User(_) => "user_command",
            Self::Message(_) => "message_command",
            Self::Component(i) => i.kind.as_str(),
        }
    }
}

/// Everything the platform client feeds into the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Interaction(Interaction),
    Event(PlatformEvent),
}

impl From<Interaction> for Inbound {
    fn from(interaction: Interaction) -> Self {
        Self::Interaction(interaction)
    }
}

impl From<PlatformEvent> for Inbound {
    fn from(event: PlatformEvent) -> Self {
        Self::Event(event)
    }
}
