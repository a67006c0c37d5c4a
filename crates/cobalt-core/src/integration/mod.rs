//! Integration layer - the boundary towards the platform client.
//!
//! - Wire-format command schemas for the remote command registry
//! - The [`PlatformClient`] trait for outbound calls

pub mod client;
pub mod schema;

pub use client::{BoxedClient, PlatformClient, Reply};
pub use schema::{
    Choice, ChoiceValue, CommandKind, CommandSchema, OptionKind, OptionSchema, SyncTarget,
};
