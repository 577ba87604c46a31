//! Error types for procstat configuration.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or applying configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid metric prefix {0:?}: must match [a-zA-Z_:][a-zA-Z0-9_:]*")]
    InvalidPrefix(String),

    #[error("metric prefix already set to {0:?}")]
    PrefixAlreadySet(String),

    #[error("invalid type name {0:?}")]
    InvalidTypeName(String),
}
