//! Wire-format command schemas.
//!
//! These mirror the platform's command registration payload. A slash command
//! nests its sub-commands and sub-command groups as options of kind
//! [`OptionKind::Subcommand`] / [`OptionKind::SubcommandGroup`]:
//!
//! ```json
//! {
//!   "type": 1,
//!   "name": "admin",
//!   "description": "Administration",
//!   "options": [
//!     { "type": 2, "name": "roles", "description": "Role tools", "options": [
//!       { "type": 1, "name": "add", "description": "Add a role", "options": [
//!         { "type": 8, "name": "role", "description": "Role to add", "required": true }
//!       ] }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::{ChannelType, GroupId};

/// The kind of an application command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CommandKind {
    /// A slash command.
    ChatInput,
    /// A context-menu action on a user.
    User,
    /// A context-menu action on a message.
    Message,
}

impl From<CommandKind> for u8 {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::ChatInput => 1,
            CommandKind::User => 2,
            CommandKind::Message => 3,
        }
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::ChatInput),
            2 => Ok(Self::User),
            3 => Ok(Self::Message),
            other => Err(format!("unknown command kind {other}")),
        }
    }
}

/// The platform kind of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OptionKind {
    Subcommand,
    SubcommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl OptionKind {
    const CODES: [(OptionKind, u8); 11] = [
        (OptionKind::Subcommand, 1),
        (OptionKind::SubcommandGroup, 2),
        (OptionKind::String, 3),
        (OptionKind::Integer, 4),
        (OptionKind::Boolean, 5),
        (OptionKind::User, 6),
        (OptionKind::Channel, 7),
        (OptionKind::Role, 8),
        (OptionKind::Mentionable, 9),
        (OptionKind::Number, 10),
        (OptionKind::Attachment, 11),
    ];

    /// Returns `true` for kinds whose values can be suggested by autocomplete.
    pub const fn supports_autocomplete(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Number)
    }
}

impl From<OptionKind> for u8 {
    fn from(kind: OptionKind) -> Self {
        OptionKind::CODES
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, code)| *code)
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for OptionKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        OptionKind::CODES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| format!("unknown option kind {code}"))
    }
}

/// The typed value of a static choice or an autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A labelled choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !b
}

/// One option of a command, or a nested sub-command / group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub autocomplete: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
}

impl OptionSchema {
    /// Creates a plain value option.
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            autocomplete: false,
            channel_types: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Creates a sub-command option holding `options`.
    pub fn subcommand(
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<OptionSchema>,
    ) -> Self {
        Self {
            options,
            ..Self::new(OptionKind::Subcommand, name, description)
        }
    }

    /// Creates a sub-command group holding `subcommands`.
    pub fn group(
        name: impl Into<String>,
        description: impl Into<String>,
        subcommands: Vec<OptionSchema>,
    ) -> Self {
        Self {
            options: subcommands,
            ..Self::new(OptionKind::SubcommandGroup, name, description)
        }
    }
}

/// One command as submitted to the remote registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
}

impl CommandSchema {
    pub fn slash(
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<OptionSchema>,
    ) -> Self {
        Self {
            kind: CommandKind::ChatInput,
            name: name.into(),
            description: description.into(),
            options,
        }
    }

    /// A user-context action; these carry a name only.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::User,
            name: name.into(),
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// A message-context action; these carry a name only.
    pub fn message(name: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::Message,
            name: name.into(),
            description: String::new(),
            options: Vec::new(),
        }
    }
}

/// Scope of a bulk command replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTarget {
    /// Every group the application is installed in.
    Global,
    /// A single group; updates there are visible immediately.
    Group(GroupId),
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Group(id) => write!(f, "group {id}"),
        }
    }
}
