//! Runtime error types.

use thiserror::Error;

use cobalt_core::ClientError;

use crate::config::ConfigError;
use crate::launcher::LaunchError;

/// Errors that stop the runtime from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// The connector could not reach the platform.
    #[error("failed to connect: {0}")]
    Connect(#[source] ClientError),

    /// A shutdown signal handler could not be installed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
