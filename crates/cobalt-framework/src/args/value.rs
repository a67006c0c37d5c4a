//! Semantic argument types and the host types that carry them.

use cobalt_core::{
    Attachment, ChannelId, ChannelRef, ChannelType, Choice, ChoiceValue, OptionKind, OptionValue,
    RoleId, UserRef,
};

/// The closed set of argument types a command can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Boolean,
    Integer,
    Number,
    Attachment,
    /// A user mention, resolved to a [`UserRef`].
    User,
    /// A role mention.
    Role,
    /// A channel restricted to the listed kinds. An empty list accepts any kind.
    Channel(&'static [ChannelType]),
    /// A channel selection decoded as its [`ChannelType`].
    ChannelType,
}

impl SemanticType {
    /// The platform option kind this type is published as.
    pub const fn option_kind(self) -> OptionKind {
        match self {
            Self::String => OptionKind::String,
            Self::Boolean => OptionKind::Boolean,
            Self::Integer => OptionKind::Integer,
            Self::Number => OptionKind::Number,
            Self::Attachment => OptionKind::Attachment,
            Self::User => OptionKind::User,
            Self::Role => OptionKind::Role,
            Self::Channel(_) | Self::ChannelType => OptionKind::Channel,
        }
    }

    /// Channel kinds the platform should offer, empty for "any".
    pub const fn channel_types(self) -> &'static [ChannelType] {
        match self {
            Self::Channel(kinds) => kinds,
            _ => &[],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Attachment => "attachment",
            Self::User => "user",
            Self::Role => "role",
            Self::Channel(_) => "channel",
            Self::ChannelType => "channel type",
        }
    }
}

/// A host type that can be bound to one command argument.
///
/// Implemented for the supported field types; anything else fails to compile
/// when used in an argument declaration.
pub trait ArgValue: Sized + Send + Sync + 'static {
    /// The semantic type published for this host type.
    const SEMANTIC: SemanticType;

    /// Reads the host value from a resolved option, `None` on a kind mismatch.
    fn from_option(value: &OptionValue) -> Option<Self>;

    /// Converts the host value back into an option value.
    fn to_option(&self) -> OptionValue;

    /// Static choices implied by the type itself.
    fn implied_choices() -> Vec<Choice> {
        Vec::new()
    }
}

/// A host type whose values can be offered as static choices.
pub trait ChoiceArg: ArgValue {
    fn to_choice_value(&self) -> ChoiceValue;
}

impl ArgValue for String {
    const SEMANTIC: SemanticType = SemanticType::String;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::String(self.clone())
    }
}

impl ChoiceArg for String {
    fn to_choice_value(&self) -> ChoiceValue {
        ChoiceValue::String(self.clone())
    }
}

impl ArgValue for bool {
    const SEMANTIC: SemanticType = SemanticType::Boolean;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Boolean(*self)
    }
}

impl ArgValue for i64 {
    const SEMANTIC: SemanticType = SemanticType::Integer;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Integer(*self)
    }
}

impl ChoiceArg for i64 {
    fn to_choice_value(&self) -> ChoiceValue {
        ChoiceValue::Integer(*self)
    }
}

/// Platform integers are 64-bit; the value is truncated to fit.
impl ArgValue for i32 {
    const SEMANTIC: SemanticType = SemanticType::Integer;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Integer(i) => Some(*i as i32),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Integer(i64::from(*self))
    }
}

impl ChoiceArg for i32 {
    fn to_choice_value(&self) -> ChoiceValue {
        ChoiceValue::Integer(i64::from(*self))
    }
}

/// Integer values are widened.
impl ArgValue for f64 {
    const SEMANTIC: SemanticType = SemanticType::Number;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Number(*self)
    }
}

impl ChoiceArg for f64 {
    fn to_choice_value(&self) -> ChoiceValue {
        ChoiceValue::Number(*self)
    }
}

/// Values are narrowed to single precision.
impl ArgValue for f32 {
    const SEMANTIC: SemanticType = SemanticType::Number;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Number(n) => Some(*n as f32),
            OptionValue::Integer(i) => Some(*i as f32),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Number(f64::from(*self))
    }
}

impl ChoiceArg for f32 {
    fn to_choice_value(&self) -> ChoiceValue {
        ChoiceValue::Number(f64::from(*self))
    }
}

impl ArgValue for Attachment {
    const SEMANTIC: SemanticType = SemanticType::Attachment;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Attachment(a) => Some(a.clone()),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Attachment(self.clone())
    }
}

impl ArgValue for UserRef {
    const SEMANTIC: SemanticType = SemanticType::User;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::User(u) => Some(u.clone()),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::User(self.clone())
    }
}

impl ArgValue for RoleId {
    const SEMANTIC: SemanticType = SemanticType::Role;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Role(id) => Some(*id),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Role(*self)
    }
}

/// Only the selected channel's kind is kept; the id is not recoverable.
impl ArgValue for ChannelType {
    const SEMANTIC: SemanticType = SemanticType::ChannelType;

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Channel(channel) => Some(channel.kind),
            _ => None,
        }
    }

    fn to_option(&self) -> OptionValue {
        OptionValue::Channel(ChannelRef {
            id: ChannelId(0),
            kind: *self,
        })
    }
}

// ============================================================================
// Channel arguments
// ============================================================================

macro_rules! channel_args {
    ($($(#[$doc:meta])* $name:ident => [$($kind:ident),*];)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub ChannelRef);

            impl $name {
                /// Channel kinds accepted by this argument type.
                pub const KINDS: &'static [ChannelType] = &[$(ChannelType::$kind),*];

                pub fn id(&self) -> ChannelId {
                    self.0.id
                }

                pub fn kind(&self) -> ChannelType {
                    self.0.kind
                }
            }

            impl ArgValue for $name {
                const SEMANTIC: SemanticType = SemanticType::Channel(Self::KINDS);

                fn from_option(value: &OptionValue) -> Option<Self> {
                    match value {
                        OptionValue::Channel(channel)
                            if Self::KINDS.is_empty() || Self::KINDS.contains(&channel.kind) =>
                        {
                            Some(Self(*channel))
                        }
                        _ => None,
                    }
                }

                fn to_option(&self) -> OptionValue {
                    OptionValue::Channel(self.0)
                }
            }
        )*
    };
}

channel_args! {
    /// Any channel.
    GuildChannel => [];
    TextChannel => [GuildText];
    NewsChannel => [GuildNews];
    ThreadChannel => [NewsThread, PublicThread, PrivateThread];
    VoiceChannel => [GuildVoice];
    StageChannel => [GuildStageVoice];
    /// A voice or stage channel.
    AudioChannel => [GuildVoice, GuildStageVoice];
    /// Any channel messages can be posted in.
    MessageChannel => [GuildText, GuildNews, GuildVoice, NewsThread, PublicThread, PrivateThread];
}
