//! In-memory data-plane manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dataplane_spi::{
    DataFlowStartMessage, DataFlowState, DataPlaneManager, FlowType, ResponseStatus,
    StatusFailure, StatusResult,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct TrackedFlow {
    message: DataFlowStartMessage,
    state: DataFlowState,
    reason: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TrackedFlow {
    fn transition_to(&mut self, state: DataFlowState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

/// Tracks data flows in memory; no data is actually moved.
#[derive(Debug, Default)]
pub struct InMemoryDataPlaneManager {
    flows: RwLock<HashMap<String, TrackedFlow>>,
}

impl InMemoryDataPlaneManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Termination reason recorded for a flow.
    pub async fn termination_reason(&self, process_id: &str) -> Option<String> {
        self.flows
            .read()
            .await
            .get(process_id)
            .and_then(|flow| flow.reason.clone())
    }

    /// Start message a flow was initiated with.
    pub async fn start_message(&self, process_id: &str) -> Option<DataFlowStartMessage> {
        self.flows
            .read()
            .await
            .get(process_id)
            .map(|flow| flow.message.clone())
    }

    /// Number of tracked flows.
    pub async fn len(&self) -> usize {
        self.flows.read().await.len()
    }

    /// Whether no flow is tracked.
    pub async fn is_empty(&self) -> bool {
        self.flows.read().await.is_empty()
    }
}

#[async_trait]
impl DataPlaneManager for InMemoryDataPlaneManager {
    async fn validate(&self, message: &DataFlowStartMessage) -> StatusResult<()> {
        let mut problems = Vec::new();

        if message.process_id.trim().is_empty() {
            problems.push("processId must not be empty".to_string());
        }
        if message.source_data_address.address_type().trim().is_empty() {
            problems.push("sourceDataAddress type must not be empty".to_string());
        }
        if message.transfer_type.destination_type.trim().is_empty() {
            problems.push("transferTypeDestination must not be empty".to_string());
        }
        if message.flow_type() == FlowType::Push && message.destination_data_address.is_none() {
            problems.push("PUSH flows require a destinationDataAddress".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(StatusFailure::new(ResponseStatus::FatalError, problems))
        }
    }

    async fn initiate(&self, message: DataFlowStartMessage) -> StatusResult<()> {
        let process_id = message.process_id.clone();
        let mut flow = TrackedFlow {
            message,
            state: DataFlowState::Received,
            reason: None,
            updated_at: Utc::now(),
        };
        debug!(process_id = %process_id, "Data flow received");

        flow.transition_to(DataFlowState::Started);
        self.flows.write().await.insert(process_id.clone(), flow);
        info!(process_id = %process_id, "Data flow started");
        Ok(())
    }

    async fn terminate(&self, process_id: &str, reason: Option<String>) -> StatusResult<()> {
        let mut flows = self.flows.write().await;
        let flow = flows
            .get_mut(process_id)
            .ok_or_else(|| StatusFailure::fatal(format!("Data flow {process_id} not found")))?;

        if flow.state.is_terminal() {
            return Err(StatusFailure::fatal(format!(
                "Data flow {process_id} is already {}",
                flow.state
            )));
        }

        flow.transition_to(DataFlowState::Terminated);
        flow.reason = reason;
        info!(process_id, reason = ?flow.reason, "Data flow terminated");
        Ok(())
    }

    async fn transfer_state(&self, process_id: &str) -> DataFlowState {
        self.flows
            .read()
            .await
            .get(process_id)
            .map_or(DataFlowState::NotTracked, |flow| flow.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataplane_spi::{DataAddress, TransferType};
    use test_utils::fixtures::{pull_start_message, push_start_message};

    #[tokio::test]
    async fn test_validate_accepts_complete_messages() {
        let manager = InMemoryDataPlaneManager::new();

        assert!(manager.validate(&push_start_message("p-1")).await.is_ok());
        assert!(manager.validate(&pull_start_message("p-2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_reports_every_problem() {
        let manager = InMemoryDataPlaneManager::new();
        let message = DataFlowStartMessage::new("", DataAddress::new(""))
            .with_transfer_type(TransferType::new("", FlowType::Push));

        let failure = manager.validate(&message).await.unwrap_err();

        assert_eq!(failure.status, ResponseStatus::FatalError);
        assert_eq!(failure.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_initiate_then_terminate() {
        let manager = InMemoryDataPlaneManager::new();
        manager.initiate(push_start_message("p-1")).await.unwrap();
        assert_eq!(manager.transfer_state("p-1").await, DataFlowState::Started);

        manager
            .terminate("p-1", Some("done".into()))
            .await
            .unwrap();

        assert_eq!(manager.transfer_state("p-1").await, DataFlowState::Terminated);
        assert_eq!(manager.termination_reason("p-1").await.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_terminate_twice_fails() {
        let manager = InMemoryDataPlaneManager::new();
        manager.initiate(push_start_message("p-1")).await.unwrap();
        manager.terminate("p-1", None).await.unwrap();

        let failure = manager.terminate("p-1", None).await.unwrap_err();
        assert_eq!(failure.messages, vec!["Data flow p-1 is already TERMINATED".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_flows() {
        let manager = InMemoryDataPlaneManager::new();

        assert_eq!(manager.transfer_state("nope").await, DataFlowState::NotTracked);
        assert!(manager.terminate("nope", None).await.is_err());
        assert!(manager.is_empty().await);
    }
}
