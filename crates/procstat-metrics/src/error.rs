//! Error types for metric observation and payload processing.

use thiserror::Error;

use procstat_core::ConfigError;

/// Result type alias for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;

/// Errors that can occur while ingesting payloads or observing values.
///
/// Apart from `Config`, raised when building a collector, none of these are
/// fatal: each is scoped to one payload or one observation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid value for {metric}: {reason}")]
    InvalidValue { metric: String, reason: String },

    #[error("metric {name} already registered as a {existing}")]
    KindConflict { name: String, existing: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MetricError {
    pub(crate) fn invalid(metric: &str, reason: impl Into<String>) -> Self {
        MetricError::InvalidValue {
            metric: metric.to_string(),
            reason: reason.into(),
        }
    }
}
