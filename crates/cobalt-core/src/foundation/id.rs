//! Typed snowflake identifiers.
//!
//! The platform identifies every entity with a 64-bit snowflake. Each entity
//! kind gets its own newtype so a role id can never be passed where a user id
//! is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_ids {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl $name {
                /// Wraps a raw snowflake.
                pub const fn new(id: u64) -> Self {
                    Self(id)
                }

                /// Returns the raw snowflake.
                pub const fn get(self) -> u64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.trim().parse().map(Self)
                }
            }

            impl From<u64> for $name {
                fn from(id: u64) -> Self {
                    Self(id)
                }
            }
        )*
    };
}

define_ids! {
    /// Identifies a user.
    UserId,
    /// Identifies a role inside a group.
    RoleId,
    /// Identifies a channel.
    ChannelId,
    /// Identifies a group (the guild-equivalent scope commands can be synced to).
    GroupId,
    /// Identifies a message.
    MessageId,
    /// Identifies an uploaded attachment.
    AttachmentId,
    /// Identifies a single interaction.
    InteractionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: GroupId = " 81384788765712384 ".parse().unwrap();
        assert_eq!(id.get(), 81384788765712384);
        assert_eq!(id.to_string(), "81384788765712384");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("guild".parse::<GroupId>().is_err());
    }
}
