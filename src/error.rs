//! Error types for contact-resolve.
//!
//! Matching itself never fails: malformed records, sentinel values and empty
//! queries degrade to empty results. Errors only come from the layers around
//! the matcher (configuration and the parallel runtime), and they are strongly
//! typed using thiserror so callers can match on specific conditions.

use thiserror::Error;

/// Validation errors raised when checking configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("'{name}' value {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        name: &'static str,
        value: f64,
    },

    #[error("'{name}' must be greater than zero")]
    ZeroLimit {
        name: &'static str,
    },

    #[error("Alias table has no labels for field '{field}'")]
    EmptyAliasList {
        field: String,
    },

    #[error("Plus-one marker cannot be empty")]
    EmptyMarker,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Failed to parse config: {message}")]
    Parse {
        message: String,
    },

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Errors raised by the parallel match runtime.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Match queue is full (capacity: {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Match worker disconnected")]
    Disconnected,

    #[error("Failed to spawn match worker '{name}': {message}")]
    WorkerSpawn {
        name: String,
        message: String,
    },
}

/// Top-level error type for contact-resolve.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl ResolveError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Matching is side-effect free, so a query rejected by a saturated
    /// runtime can simply be submitted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Config(_) => false,
            Self::Execution(e) => matches!(e, ExecutionError::QueueFull { .. }),
        }
    }
}

/// Result type alias for contact-resolve operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
