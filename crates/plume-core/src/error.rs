//! Error types for Plume

use thiserror::Error;

/// The main error type for Plume operations
#[derive(Debug, Error)]
pub enum PlumeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Particle count mismatch: expected {expected}, got {got}")]
    ParticleCountMismatch { expected: u32, got: u32 },

    #[error("Unknown preset: {name} is not one of {allowed:?}")]
    UnknownPreset { name: String, allowed: Vec<String> },

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Plume operations
pub type Result<T> = std::result::Result<T, PlumeError>;

impl From<toml::de::Error> for PlumeError {
    fn from(err: toml::de::Error) -> Self {
        PlumeError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for PlumeError {
    fn from(err: toml::ser::Error) -> Self {
        PlumeError::TomlSerError(err.to_string())
    }
}
