//! Runtime orchestration.
//!
//! The runtime owns nothing platform specific. A [`PlatformConnector`]
//! opens the connection and hands back a client plus a stream of inbound
//! items; the runtime feeds that stream into a [`Dispatcher`] in arrival
//! order until the stream ends or a shutdown signal arrives, then drains
//! in-flight work.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cobalt_runtime::{CobaltRuntime, LaunchArgs};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = LaunchArgs::from_env();
//!     let runtime = CobaltRuntime::builder()
//!         .profile("production")
//!         .build(dispatcher())?;
//!
//!     runtime.launch(&args, &GatewayConnector::default()).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use cobalt_core::{BoxedClient, ClientResult, Inbound, SyncTarget};
use cobalt_framework::{DispatchError, Dispatcher, WorkerPool};

use crate::config::{CobaltConfig, ConfigLoader, ConfigResult};
use crate::error::{RuntimeError, RuntimeResult};
use crate::launcher::{LaunchArgs, Sharding};
use crate::logging;

/// A live platform connection.
pub struct Connection {
    pub client: BoxedClient,
    /// Ends when the platform connection is gone for good.
    pub inbound: mpsc::Receiver<Inbound>,
}

impl Connection {
    pub fn new(client: BoxedClient, inbound: mpsc::Receiver<Inbound>) -> Self {
        Self { client, inbound }
    }
}

/// Opens platform connections.
///
/// Implementations own the gateway, reconnects and sharding; the runtime
/// only asks for a connection once per launch.
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    async fn connect(&self, token: &str, sharding: Sharding) -> ClientResult<Connection>;
}

pub struct CobaltRuntime {
    config: CobaltConfig,
    dispatcher: Dispatcher,
    stop: CancellationToken,
}

impl CobaltRuntime {
    /// Loads configuration from the current directory, falling back to
    /// defaults if it cannot be loaded.
    pub fn new(dispatcher: Dispatcher) -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                CobaltConfig::default()
            });

        Self::from_config(&config, dispatcher)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Installs logging from `config` unless a subscriber already exists.
    pub fn from_config(config: &CobaltConfig, dispatcher: Dispatcher) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            workers = config.workers.size,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            dispatcher,
            stop: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &CobaltConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Ends the event loop as if a shutdown signal had arrived.
    ///
    /// The runtime stays stopped; later runs return right after draining.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Connects, publishes commands if asked to, then runs until shutdown.
    ///
    /// Commands are published to the `--update-commands` target, or to the
    /// configured target when `commands.sync_on_start` is set. A failed
    /// publish is logged and the runtime keeps going.
    pub async fn launch<C>(&self, args: &LaunchArgs, connector: &C) -> RuntimeResult<()>
    where
        C: PlatformConnector + ?Sized,
    {
        let sharding = args.sharding();
        info!(?sharding, "Connecting to platform");
        let connection = connector
            .connect(&args.token, sharding)
            .await
            .map_err(RuntimeError::Connect)?;

        let commands = &self.config.commands;
        let target = args
            .update_target()
            .or_else(|| commands.sync_on_start.then(|| commands.sync_target()));
        if let Some(target) = target {
            let _ = self.sync_commands(&connection.client, target).await;
        }

        self.run(connection).await
    }

    /// Publishes the registered commands to `target`.
    pub async fn sync_commands(
        &self,
        client: &BoxedClient,
        target: SyncTarget,
    ) -> ClientResult<()> {
        self.dispatcher.synchronizer().sync(client, target).await
    }

    /// Runs until the inbound stream ends, Ctrl+C, SIGTERM or [`stop`](Self::stop).
    pub async fn run(&self, connection: Connection) -> RuntimeResult<()> {
        let signal = shutdown_signal()?;
        info!("Cobalt runtime is now running. Press Ctrl+C to stop.");
        self.run_until(connection, signal).await
    }

    /// Runs until the inbound stream ends, `shutdown` resolves or
    /// [`stop`](Self::stop) is called.
    pub async fn run_until<F>(&self, connection: Connection, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let Connection {
            client,
            mut inbound,
        } = connection;

        let dispatcher = match self.start_pool() {
            Some(pool) => self.dispatcher.clone().with_pool(pool),
            None => self.dispatcher.clone(),
        };
        let tracker = TaskTracker::new();
        tokio::pin!(shutdown);

        loop {
            let item = tokio::select! {
                () = &mut shutdown => break,
                () = self.stop.cancelled() => {
                    info!("Stop requested");
                    break;
                }
                item = inbound.recv() => item,
            };
            let Some(item) = item else {
                info!("Inbound stream closed");
                break;
            };

            // One item at a time keeps arrival order; threaded commands only
            // hold the loop until they are queued on the pool.
            let dispatcher = dispatcher.clone();
            let client = Arc::clone(&client);
            let dispatch = tracker.spawn(async move {
                if let Err(e) = dispatcher.dispatch(item, client).await {
                    report(&e);
                }
            });
            tokio::select! {
                joined = dispatch => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch task failed");
                    }
                }
                () = &mut shutdown => break,
                () = self.stop.cancelled() => {
                    info!("Stop requested");
                    break;
                }
            }
        }

        drop(inbound);
        self.drain(&tracker, dispatcher.pool()).await;
        Ok(())
    }

    /// A pool from the `workers` section, unless the dispatcher has one.
    fn start_pool(&self) -> Option<Arc<WorkerPool>> {
        if self.dispatcher.pool().is_some() {
            return None;
        }
        let config = self.config.workers.to_pool_config()?;
        Some(Arc::new(WorkerPool::start(config)))
    }

    /// Waits for in-flight dispatches, then the worker pool, sharing one
    /// grace period between them.
    async fn drain(&self, tracker: &TaskTracker, pool: Option<&Arc<WorkerPool>>) {
        let grace = self.config.shutdown.grace_period();
        let deadline = Instant::now() + grace;

        tracker.close();
        info!(
            in_flight = tracker.len(),
            grace_ms = self.config.shutdown.grace_period_ms,
            "Shutting down"
        );
        if timeout(grace, tracker.wait()).await.is_err() {
            warn!(
                in_flight = tracker.len(),
                "Grace period elapsed with dispatches still running"
            );
        }

        if let Some(pool) = pool {
            let left = deadline.saturating_duration_since(Instant::now());
            if !pool.shutdown(left).await {
                warn!("Worker pool did not drain within the grace period");
            }
        }

        info!("Runtime stopped");
    }
}

impl std::fmt::Debug for CobaltRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CobaltRuntime")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("stopped", &self.stop.is_cancelled())
            .finish()
    }
}

fn report(error: &DispatchError) {
    match error {
        // Already logged where they were detected.
        DispatchError::Decode { .. } | DispatchError::MissingAutocompleteProvider { .. } => {
            debug!(%error, "Dispatch failed");
        }
        _ => error!(%error, "Dispatch failed"),
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// Handlers are installed before this returns, so registration errors
/// surface immediately.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => {
                    error!(error = %e, "Ctrl+C handler failed, waiting for SIGTERM");
                    sigterm.recv().await;
                    info!("Received SIGTERM, shutting down");
                }
            },
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Ctrl+C handler failed");
                std::future::pending::<()>().await;
            }
        }
    })
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builds a [`CobaltRuntime`] from a customised [`ConfigLoader`].
///
/// ```rust,ignore
/// let runtime = CobaltRuntime::builder()
///     .config_file("deploy/cobalt.toml")
///     .build(dispatcher)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges `config` over every other source.
    pub fn merge(mut self, config: CobaltConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self, dispatcher: Dispatcher) -> ConfigResult<CobaltRuntime> {
        let config = self.config_loader.load()?;
        Ok(CobaltRuntime::from_config(&config, dispatcher))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
