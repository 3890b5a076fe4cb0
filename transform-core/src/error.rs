//! Transformation failure.

use thiserror::Error;

/// A transformation did not produce a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join("; "))]
pub struct TransformFailure {
    /// Problems reported while transforming, in order
    pub messages: Vec<String>,
}

impl TransformFailure {
    /// Failure with a single message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Failure with the given messages.
    #[must_use]
    pub const fn from_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// All messages joined into one line.
    #[must_use]
    pub fn detail(&self) -> String {
        self.to_string()
    }
}
