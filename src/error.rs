//! Error types for the circuit breaker library.

use thiserror::Error;

/// Result type for circuit breaker operations.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

/// Error type for circuit breaker operations.
///
/// The two variants let callers tell "the breaker denied me" apart from
/// "the operation itself failed".
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit is open, the operation was not invoked.
    #[error("circuit breaker is open")]
    Open,

    /// The underlying operation failed. The error is carried unmodified.
    #[error("operation error: {0}")]
    Operation(#[source] E),
}

impl<E> BreakerError<E> {
    /// Returns true if the call was rejected by the breaker.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open)
    }

    /// Returns true if the guarded operation ran and failed.
    pub fn is_operation(&self) -> bool {
        matches!(self, BreakerError::Operation(_))
    }

    /// Returns the operation's own error, if there is one.
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Open => None,
            BreakerError::Operation(e) => Some(e),
        }
    }
}

/// Errors raised when a breaker is configured with invalid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The failure threshold must be at least one.
    #[error("failure threshold must be greater than zero")]
    ZeroFailureThreshold,

    /// The reset timeout must be a non-zero duration.
    #[error("reset timeout must be greater than zero")]
    ZeroResetTimeout,
}
