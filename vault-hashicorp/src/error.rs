//! Vault error types using thiserror 2.0.
//!
//! Every error is classified as retryable or not; the fallback cache also
//! kicks in for an open circuit.

use connector_common::ConnectorError;
use thiserror::Error;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Vault server unavailable
    #[error("Vault unavailable: {0}")]
    Unavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Secret not found
    #[error("Secret not found at path: {0}")]
    SecretNotFound(String),

    /// Token renewal failed
    #[error("Token renewal failed: {0}")]
    TokenRenewalFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input, rejected before any request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limited
    #[error("Rate limited")]
    RateLimited,

    /// Circuit breaker open
    #[error("Circuit breaker open")]
    CircuitBreakerOpen,

    /// Any other status
    #[error("Unexpected status {status}: {body}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Check if error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::RateLimited)
    }

    /// Whether a cached value may be served instead.
    #[must_use]
    pub const fn allows_fallback(&self) -> bool {
        self.is_retryable() || matches!(self, Self::CircuitBreakerOpen)
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an authentication failed error.
    #[must_use]
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailed(msg.into())
    }

    /// Create a secret not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::SecretNotFound(path.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Classify a non-success status.
    #[must_use]
    pub fn from_status(status: u16, path: &str, body: String) -> Self {
        match status {
            404 => Self::not_found(path),
            401 | 403 => Self::PermissionDenied(path.to_string()),
            429 => Self::RateLimited,
            s if s >= 500 => Self::unavailable(format!("Status {status}: {body}")),
            _ => Self::Unexpected { status, body },
        }
    }

    pub(crate) fn from_connector(err: ConnectorError, path: &str) -> Self {
        match err {
            ConnectorError::Status { status, body } => Self::from_status(status, path, body),
            ConnectorError::CircuitOpen { .. } => Self::CircuitBreakerOpen,
            ConnectorError::Serialization(e) => Self::Serialization(e),
            ConnectorError::Unavailable(msg) | ConnectorError::Timeout(msg) => Self::Unavailable(msg),
            ConnectorError::InvalidInput(msg) => Self::InvalidInput(msg),
            ConnectorError::Http(e) => Self::InvalidConfig(e.to_string()),
            ConnectorError::Internal(msg) => Self::unavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::unavailable("connection refused");
        assert_eq!(err.to_string(), "Vault unavailable: connection refused");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(VaultError::Unavailable("timeout".to_string()).is_retryable());
        assert!(VaultError::RateLimited.is_retryable());
        assert!(!VaultError::SecretNotFound("path".to_string()).is_retryable());
        assert!(!VaultError::CircuitBreakerOpen.is_retryable());
        assert!(VaultError::CircuitBreakerOpen.allows_fallback());
        assert!(!VaultError::PermissionDenied("path".to_string()).allows_fallback());
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(VaultError::from_status(404, "k", String::new()), VaultError::SecretNotFound(_)));
        assert!(matches!(VaultError::from_status(401, "k", String::new()), VaultError::PermissionDenied(_)));
        assert!(matches!(VaultError::from_status(403, "k", String::new()), VaultError::PermissionDenied(_)));
        assert!(matches!(VaultError::from_status(429, "k", String::new()), VaultError::RateLimited));
        assert!(matches!(VaultError::from_status(503, "k", String::new()), VaultError::Unavailable(_)));
        assert!(matches!(
            VaultError::from_status(400, "k", "bad".into()),
            VaultError::Unexpected { status: 400, .. }
        ));
    }

    #[test]
    fn test_from_connector_error() {
        let err = VaultError::from_connector(ConnectorError::circuit_open("vault"), "k");
        assert!(matches!(err, VaultError::CircuitBreakerOpen));

        let err = VaultError::from_connector(ConnectorError::Timeout("30s".into()), "k");
        assert!(err.is_retryable());
    }
}
