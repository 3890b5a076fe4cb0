//! Selector errors.

use thiserror::Error;

/// Selector failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// No available instance can serve the request.
    #[error("no data plane found for source type '{source_type}' and transfer type '{}'", .transfer_type.as_deref().unwrap_or("<any>"))]
    NotFound {
        /// Requested source address type
        source_type: String,
        /// Requested transfer type
        transfer_type: Option<String>,
    },

    /// The named strategy is not registered.
    #[error("selection strategy '{0}' not found")]
    StrategyNotFound(String),

    /// No instance has the given id.
    #[error("data plane instance '{0}' not found")]
    UnknownInstance(String),
}

impl SelectorError {
    /// Whether retrying later might succeed; instances may become available.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
