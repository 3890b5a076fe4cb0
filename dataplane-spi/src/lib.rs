//! Data-plane signaling SPI.
//!
//! Domain model shared by the signaling client, the signaling API and the
//! data-plane selector, plus the extension traits they plug into:
//!
//! - [`DataPlaneClient`] / [`DataPlaneClientFactory`]: control-plane side
//! - [`DataPlaneManager`] / [`DataPlaneAuthorizationService`]: data-plane side

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod client;
pub mod instance;
pub mod manager;
pub mod message;
pub mod state;
pub mod status;

pub use address::{DataAddress, FlowType, TransferType};
pub use client::{DataPlaneClient, DataPlaneClientFactory};
pub use instance::{DataPlaneInstance, DataPlaneInstanceState};
pub use manager::{DataPlaneAuthorizationService, DataPlaneManager};
pub use message::{
    DataFlowResponseMessage, DataFlowStartMessage, DataFlowSuspendMessage,
    DataFlowTerminateMessage,
};
pub use state::DataFlowState;
pub use status::{ResponseStatus, StatusFailure, StatusResult};

use thiserror::Error;

/// A textual value could not be parsed into a domain enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseError {
    /// What was being parsed
    pub kind: &'static str,
    /// Offending input
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
