//! Channel kinds.

use serde::{Deserialize, Serialize};

/// The kind of a channel, using the platform's numeric codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ChannelType {
    GuildText,
    Dm,
    GuildVoice,
    GroupDm,
    GuildCategory,
    GuildNews,
    NewsThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildDirectory,
    GuildForum,
}

impl ChannelType {
    /// Every known channel kind.
    pub const ALL: &'static [ChannelType] = &[
        ChannelType::GuildText,
        ChannelType::Dm,
        ChannelType::GuildVoice,
        ChannelType::GroupDm,
        ChannelType::GuildCategory,
        ChannelType::GuildNews,
        ChannelType::NewsThread,
        ChannelType::PublicThread,
        ChannelType::PrivateThread,
        ChannelType::GuildStageVoice,
        ChannelType::GuildDirectory,
        ChannelType::GuildForum,
    ];

    /// Returns the platform's numeric code.
    pub const fn code(self) -> u8 {
        match self {
            Self::GuildText => 0,
            Self::Dm => 1,
            Self::GuildVoice => 2,
            Self::GroupDm => 3,
            Self::GuildCategory => 4,
            Self::GuildNews => 5,
            Self::NewsThread => 10,
            Self::PublicThread => 11,
            Self::PrivateThread => 12,
            Self::GuildStageVoice => 13,
            Self::GuildDirectory => 14,
            Self::GuildForum => 15,
        }
    }

    /// Returns the lowercase name used in logs and as a choice label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GuildText => "text",
            Self::Dm => "dm",
            Self::GuildVoice => "voice",
            Self::GroupDm => "group_dm",
            Self::GuildCategory => "category",
            Self::GuildNews => "news",
            Self::NewsThread => "news_thread",
            Self::PublicThread => "public_thread",
            Self::PrivateThread => "private_thread",
            Self::GuildStageVoice => "stage",
            Self::GuildDirectory => "directory",
            Self::GuildForum => "forum",
        }
    }

    /// Returns `true` for the three thread kinds.
    pub const fn is_thread(self) -> bool {
        matches!(
            self,
            Self::NewsThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

impl From<ChannelType> for u8 {
    fn from(kind: ChannelType) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for ChannelType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ChannelType::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| format!("unknown channel type code {code}"))
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_for_every_kind() {
        for kind in ChannelType::ALL {
            assert_eq!(ChannelType::try_from(kind.code()), Ok(*kind));
        }
        assert!(ChannelType::try_from(7).is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&ChannelType::GuildStageVoice).unwrap();
        assert_eq!(json, "13");
    }
}
