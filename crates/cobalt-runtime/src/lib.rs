//! Cobalt Runtime - configuration, logging and process lifecycle.
//!
//! This crate provides:
//! - Layered configuration (`CobaltConfig`, `ConfigLoader`)
//! - Logging setup on `tracing-subscriber` (`LoggingBuilder`)
//! - The launcher flag surface (`LaunchArgs`, `ShardRange`)
//! - The event loop and graceful shutdown (`CobaltRuntime`)
//!
//! The platform connection itself is supplied by a [`PlatformConnector`].
//!
//! ```ignore
//! use cobalt_runtime::{CobaltRuntime, LaunchArgs};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CobaltRuntime::new(build_dispatcher());
//!     runtime.launch(&LaunchArgs::from_env(), &MyConnector::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{CobaltConfig, ConfigError, ConfigLoader, ConfigResult, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use launcher::{LaunchArgs, LaunchError, LaunchResult, ShardRange, Sharding};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CobaltRuntime, Connection, PlatformConnector, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
