//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`cobalt.{profile}.toml`)
//! 3. Main config file (`cobalt.toml`, or `config.toml`)
//! 4. Environment variables (`COBALT_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `COBALT_` prefix with `__` as separator:
//!
//! - `COBALT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `COBALT_WORKERS__QUEUE_FULL=reject` → `workers.queue_full = "reject"`
//! - `COBALT_COMMANDS__SYNC_GROUP=123` → `commands.sync_group = 123`
//!
//! `COBALT_PROFILE` selects the profile.
//!
//! # Example
//!
//! ```rust,ignore
//! use cobalt_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::CobaltConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "COBALT_";
const PROFILE_VAR: &str = "COBALT_PROFILE";
#[cfg(feature = "toml-config")]
const FILE_NAMES: &[&str] = &["cobalt.toml", "config.toml"];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `COBALT_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layered configuration loader.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Loads exactly this file instead of searching.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("cobalt")),
            None => self,
        }
    }

    /// Loads `path` instead of searching; a missing file is an error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges `config` over every other source.
    pub fn merge(mut self, config: CobaltConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads, extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<CobaltConfig> {
        let profile = self.profile.clone();
        let config: CobaltConfig = self.build_figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            workers = config.workers.size,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(CobaltConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["PROFILE"])
                    .split("__"),
            );
        }

        Ok(figment.merge(self.overrides))
    }

    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cobalt"));
        }
        paths
    }

    /// Merges the first base file found, preceded by its profile variant.
    #[cfg(feature = "toml-config")]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for base_name in FILE_NAMES {
                let stem = base_name.trim_end_matches(".toml");

                let profile_path = search_path.join(format!("{stem}.{}.toml", self.profile));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = figment.merge(Toml::file(&profile_path));
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    // The base file is merged after the profile file, so
                    // profile values only fill what the base leaves unset.
                    return figment.merge(Toml::file(&base_path));
                }
            }
        }
        warn!("No configuration file found, using defaults");
        figment
    }

    #[cfg(not(feature = "toml-config"))]
    fn load_config_files(&self, figment: Figment) -> Figment {
        let _ = self.resolve_search_paths();
        debug!("No configuration format enabled, skipping file search");
        figment
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<CobaltConfig> {
    ConfigLoader::new().load()
}

/// Loads the configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<CobaltConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::config::schema::{LogFormat, LogLevel, WorkerConfig};
    use cobalt_core::GroupId;
    use cobalt_framework::QueueFullPolicy;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|_| {
            let config = ConfigLoader::new().without_env().load().unwrap();
            assert_eq!(config, CobaltConfig::default());
            assert_eq!(config.logging.level.as_str(), "info");
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cobalt.toml",
                r#"
                [logging]
                level = "debug"
                format = "pretty"

                [workers]
                size = 2
                queue_full = "drop_oldest"

                [commands]
                sync_group = 42
                "#,
            )?;
            jail.set_env("COBALT_LOGGING__LEVEL", "warn");
            jail.set_env("COBALT_SHUTDOWN__GRACE_PERIOD_MS", "250");

            let config = ConfigLoader::new().load().unwrap();
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.logging.format, LogFormat::Pretty);
            assert_eq!(config.workers.size, 2);
            assert_eq!(config.workers.queue_full, QueueFullPolicy::DropOldest);
            assert_eq!(config.commands.sync_group, Some(GroupId::new(42)));
            assert_eq!(config.shutdown.grace_period_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn test_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_file("cobalt.production.toml", "[workers]\nsize = 16\n")?;
            jail.create_file("cobalt.toml", "[logging]\nlevel = \"error\"\n")?;

            let config = ConfigLoader::new().without_env().profile("prod").load().unwrap();
            assert_eq!(config.workers.size, 16);
            assert_eq!(config.logging.level, LogLevel::Error);

            let config = ConfigLoader::new().without_env().profile("dev").load().unwrap();
            assert_eq!(config.workers.size, WorkerConfig::default().size);
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_override_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("COBALT_WORKERS__SIZE", "3");

            let mut overrides = CobaltConfig::default();
            overrides.workers.size = 9;
            let config = ConfigLoader::new().merge(overrides).load().unwrap();
            assert_eq!(config.workers.size, 9);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_| {
            let result = ConfigLoader::new().file("nope.toml").load();
            assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("cobalt.toml", "[logging]\noutput = \"file\"\n")?;
            let result = ConfigLoader::new().without_env().load();
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("COBALT_PROFILE", "production");
            assert_eq!(Profile::from_env(), Profile::Production);
            jail.set_env("COBALT_PROFILE", "Staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".into()));
            Ok(())
        });
    }
}
