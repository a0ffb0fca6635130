use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to create config directory: {0}")]
    ConfigDirCreationFailed(#[from] std::io::Error),

    #[error("Failed to write config file: {0}")]
    ConfigWriteFailed(#[source] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config validation failed: {reason}")]
    ConfigValidationFailed { reason: String },

    // Grid-related errors
    #[error("Invalid grid dimensions: {width}x{height} cells at cell size {cell_size}")]
    InvalidGridDimensions {
        width: u32,
        height: u32,
        cell_size: f32,
    },
}

/// Result type alias for all operations
pub type NavResult<T> = Result<T, NavError>;
