//! Data-plane side of signaling.

use crate::{DataAddress, DataFlowStartMessage, DataFlowState, StatusResult};
use async_trait::async_trait;

/// Runs data flows on a data plane.
#[async_trait]
pub trait DataPlaneManager: Send + Sync {
    /// Check that a start message can be served.
    async fn validate(&self, message: &DataFlowStartMessage) -> StatusResult<()>;

    /// Accept and start a flow.
    async fn initiate(&self, message: DataFlowStartMessage) -> StatusResult<()>;

    /// Terminate a flow.
    async fn terminate(&self, process_id: &str, reason: Option<String>) -> StatusResult<()>;

    /// Current state of a flow; unknown flows are `NOT_TRACKED`.
    async fn transfer_state(&self, process_id: &str) -> DataFlowState;
}

/// Issues and checks endpoint data references for PULL flows.
#[async_trait]
pub trait DataPlaneAuthorizationService: Send + Sync {
    /// Create the endpoint data reference a consumer uses to reach the flow.
    async fn create_endpoint_data_reference(
        &self,
        message: &DataFlowStartMessage,
    ) -> StatusResult<DataAddress>;

    /// Resolve an access token to the source address it grants.
    async fn authorize(&self, token: &str) -> StatusResult<DataAddress>;

    /// Invalidate every token issued for a flow.
    async fn revoke(&self, process_id: &str) -> StatusResult<()>;
}
