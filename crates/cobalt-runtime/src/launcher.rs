//! Command-line launcher flags.
//!
//! ```text
//! cobalt [OPTIONS] <TOKEN>
//!
//!   -s, --sharded[=<RANGE>]           start sharded, optionally only shards min-max of total
//!   -u, --update-commands[=<GROUP>]   publish commands globally, or to one group
//!   -h, --help
//! ```
//!
//! Flag values must be attached with `=` so that a bare `-s` is never
//! mistaken for one that consumes the token. The older `-uc` spelling is
//! accepted as `-u`.

use std::ffi::OsString;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use clap::Parser;
use thiserror::Error;

use cobalt_core::{GroupId, SyncTarget};

/// Errors raised while reading launcher flags.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bad or missing flags; also carries `--help` output.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("invalid shard range '{input}': {reason}")]
    InvalidShardRange { input: String, reason: &'static str },
}

impl LaunchError {
    fn shard_range(input: &str, reason: &'static str) -> Self {
        Self::InvalidShardRange {
            input: input.to_string(),
            reason,
        }
    }
}

/// Result type for launcher parsing.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// A contiguous block of shards out of `total`, written `min-max/total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShardRange {
    min: u32,
    max: u32,
    total: u32,
}

impl ShardRange {
    /// Rejects `min > max` and `max >= total`.
    pub fn new(min: u32, max: u32, total: u32) -> LaunchResult<Self> {
        let range = Self { min, max, total };
        if min > max {
            return Err(LaunchError::shard_range(&range.to_string(), "min is above max"));
        }
        if max >= total {
            return Err(LaunchError::shard_range(
                &range.to_string(),
                "max must be below total",
            ));
        }
        Ok(range)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn ids(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    /// Number of shards this process runs.
    pub fn len(&self) -> u32 {
        self.max - self.min + 1
    }
}

impl fmt::Display for ShardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}/{}", self.min, self.max, self.total)
    }
}

impl FromStr for ShardRange {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (range, total) = s
            .split_once('/')
            .ok_or_else(|| LaunchError::shard_range(s, "expected min-max/total"))?;
        let (min, max) = range
            .split_once('-')
            .ok_or_else(|| LaunchError::shard_range(s, "expected min-max/total"))?;

        let number = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| LaunchError::shard_range(s, "not a shard number"))
        };
        Self::new(number(min)?, number(max)?, number(total)?)
    }
}

/// How the connector should shard the gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sharding {
    /// One unsharded connection.
    #[default]
    Single,
    /// Every shard, with the count chosen by the platform.
    Auto,
    Range(ShardRange),
}

/// Launcher flags.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "cobalt",
    about = "Starts a Cobalt bot",
    arg_required_else_help = true
)]
pub struct LaunchArgs {
    /// Bot token.
    pub token: String,

    /// Start sharded, optionally with a shard range (min-max/total).
    #[arg(
        short = 's',
        long = "sharded",
        value_name = "RANGE",
        num_args = 0..=1,
        require_equals = true
    )]
    pub sharded: Option<Option<ShardRange>>,

    /// Publish commands globally, or to one group when an id is given
    /// (`-uc` also works).
    #[arg(
        short = 'u',
        long = "update-commands",
        value_name = "GROUP_ID",
        num_args = 0..=1,
        require_equals = true
    )]
    pub update_commands: Option<Option<GroupId>>,
}

impl LaunchArgs {
    /// Parses the process arguments, exiting with usage on error or `--help`.
    pub fn from_env() -> Self {
        Self::parse_from(legacy_spellings(std::env::args_os()))
    }

    /// Parses `args`; the first item is the program name.
    pub fn try_from_args<I, T>(args: I) -> LaunchResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(legacy_spellings(args))?)
    }

    pub fn sharding(&self) -> Sharding {
        match self.sharded {
            None => Sharding::Single,
            Some(None) => Sharding::Auto,
            Some(Some(range)) => Sharding::Range(range),
        }
    }

    /// Where to publish commands, if `--update-commands` was given.
    pub fn update_target(&self) -> Option<SyncTarget> {
        self.update_commands
            .map(|group| group.map_or(SyncTarget::Global, SyncTarget::Group))
    }
}

/// Rewrites `-uc[=GROUP_ID]` to `-u[=GROUP_ID]`.
fn legacy_spellings<I, T>(args: I) -> impl Iterator<Item = OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter().map(|arg| {
        let arg: OsString = arg.into();
        let legacy = arg
            .to_str()
            .and_then(|s| s.strip_prefix("-uc"))
            .filter(|rest| rest.is_empty() || rest.starts_with('='))
            .map(|rest| format!("-u{rest}"));
        legacy.map_or(arg, OsString::from)
    })
}
