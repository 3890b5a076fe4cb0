//! Control-plane side of data-plane signaling.

use crate::{DataFlowResponseMessage, DataFlowStartMessage, DataPlaneInstance, StatusResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Sends control messages to one data-plane instance.
#[async_trait]
pub trait DataPlaneClient: Send + Sync {
    /// Start a data flow.
    async fn start(&self, message: &DataFlowStartMessage)
    -> StatusResult<DataFlowResponseMessage>;

    /// Suspend a running flow.
    async fn suspend(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()>;

    /// Terminate a flow.
    async fn terminate(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()>;

    /// Check whether the instance answers.
    async fn check_availability(&self) -> StatusResult<()>;
}

/// Creates clients bound to an instance.
pub trait DataPlaneClientFactory: Send + Sync {
    /// Client targeting `instance`.
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient>;
}
