//! Centralized error types for connector extensions.
//!
//! Every error is classified as retryable or not, which the retry policy and
//! the circuit breaker both rely on.

use crate::retry::Retryable;
use thiserror::Error;

/// Common error type for outbound calls.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// HTTP client could not be built or a request could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Circuit breaker is open for the specified service
    #[error("Circuit breaker open for {service}")]
    CircuitOpen {
        /// The service name that has an open circuit
        service: String,
    },

    /// Remote endpoint could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Remote endpoint answered with an error status
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConnectorError {
    /// Check if this error is retryable.
    ///
    /// Transport failures, timeouts, rate limiting (429) and server errors (5xx)
    /// are transient and may succeed on retry.
    ///
    /// # Examples
    ///
    /// ```
    /// use connector_common::ConnectorError;
    ///
    /// let err = ConnectorError::Status { status: 503, body: String::new() };
    /// assert!(err.is_retryable());
    ///
    /// let err = ConnectorError::Status { status: 404, body: String::new() };
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Create a circuit open error for the given service.
    #[must_use]
    pub fn circuit_open(service: impl Into<String>) -> Self {
        Self::CircuitOpen {
            service: service.into(),
        }
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map a transport-level reqwest failure.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }

    /// Status code carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Retryable for ConnectorError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Whether an HTTP status code denotes a transient failure.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}
