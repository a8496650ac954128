//! Engine configuration.
//!
//! Read from `<config_dir>/focusgate/config.json`. Every field is optional
//! in the file; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "focusgate";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "policy.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No data directory available for the policy database")]
    NoDataDir,
}

/// Tunables for the focus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the poll loop.
    pub poll_interval_ms: u64,
    /// Lookback window for foreground-transition queries.
    pub query_window_ms: u64,
    /// Minimum spacing between block-screen launches.
    pub cooldown_ms: u64,
    /// Delay before restarting after task removal.
    pub restart_delay_ms: u64,
    /// The engine's own app, never blocked.
    pub own_app_id: String,
    /// Policy database location. Defaults under the user data dir.
    pub database_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            query_window_ms: 5_000,
            cooldown_ms: 1_500,
            restart_delay_ms: 500,
            own_app_id: "app.focusgate".to_string(),
            database_path: None,
        }
    }
}

impl EngineConfig {
    /// Load from the default location, or defaults if there is no file.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.query_window_ms == 0 {
            return Err(ConfigError::Invalid("query_window_ms must be positive".into()));
        }
        // Millisecond arithmetic on timestamps is done in i64.
        for (field, value) in [
            ("query_window_ms", self.query_window_ms),
            ("cooldown_ms", self.cooldown_ms),
        ] {
            if i64::try_from(value).is_err() {
                return Err(ConfigError::Invalid(format!("{field} is out of range")));
            }
        }
        if self.own_app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("own_app_id must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn query_window(&self) -> Duration {
        Duration::from_millis(self.query_window_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    /// Resolved database path: the configured one, else the platform default.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        self.database_path
            .clone()
            .or_else(default_database_path)
            .ok_or(ConfigError::NoDataDir)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
}
