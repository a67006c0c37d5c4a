//! Runtime configuration.
//!
//! Sources are layered with figment: built-in defaults, then
//! `cobalt.toml` (and its profile variant), then `COBALT_*` environment
//! variables, then programmatic overrides.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CobaltConfig, CommandsConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    ShutdownConfig, SpanEventConfig, WorkerConfig,
};
pub use validation::validate_config;
