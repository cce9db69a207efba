//! Error types for Neon Dash.

use thiserror::Error;

/// Top-level error type for Neon Dash operations.
#[derive(Debug, Error)]
pub enum DashError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },

    /// Frame driver failure (thread spawn, poisoned join)
    #[error("Driver error: {0}")]
    Driver(String),
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A field holds a value the simulation cannot run with
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for Neon Dash operations.
pub type DashResult<T> = Result<T, DashError>;
