use crate::config::ConfigError;
use focusgate_gate::GateError;
use focusgate_policy::{SettingsError, StorageError};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
