//! Outcome of signaling operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How a caller should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Retrying will not help.
    FatalError,
    /// The operation may succeed later.
    ErrorRetry,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FatalError => "FATAL_ERROR",
            Self::ErrorRetry => "ERROR_RETRY",
        })
    }
}

/// Failed signaling operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {}", .messages.join(", "))]
pub struct StatusFailure {
    /// Failure class
    pub status: ResponseStatus,
    /// Failure messages, in order
    pub messages: Vec<String>,
}

impl StatusFailure {
    /// Failure with the given status and messages.
    #[must_use]
    pub const fn new(status: ResponseStatus, messages: Vec<String>) -> Self {
        Self { status, messages }
    }

    /// Non-retryable failure.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ResponseStatus::FatalError, vec![message.into()])
    }

    /// Retryable failure.
    #[must_use]
    pub fn retry(message: impl Into<String>) -> Self {
        Self::new(ResponseStatus::ErrorRetry, vec![message.into()])
    }

    /// Messages joined into one line.
    #[must_use]
    pub fn failure_detail(&self) -> String {
        self.messages.join(", ")
    }

    /// Whether the operation may succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.status == ResponseStatus::ErrorRetry
    }
}

/// Result of a signaling operation.
pub type StatusResult<T> = Result<T, StatusFailure>;
