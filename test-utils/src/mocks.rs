//! Mock implementations for testing.
//!
//! Mocks record the calls they receive and answer with scripted results.

use async_trait::async_trait;
use dataplane_spi::{
    DataFlowResponseMessage, DataFlowStartMessage, DataPlaneClient, DataPlaneClientFactory,
    DataPlaneInstance, StatusFailure, StatusResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A call received by [`MockDataPlaneClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `start` with the message's process id
    Start(String),
    /// `suspend` with process id and reason
    Suspend(String, Option<String>),
    /// `terminate` with process id and reason
    Terminate(String, Option<String>),
    /// `check_availability`
    CheckAvailability,
}

#[derive(Debug)]
struct Script {
    available: bool,
    delay: Duration,
    start: StatusResult<DataFlowResponseMessage>,
    suspend: StatusResult<()>,
    terminate: StatusResult<()>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            available: true,
            delay: Duration::ZERO,
            start: Ok(DataFlowResponseMessage::default()),
            suspend: Ok(()),
            terminate: Ok(()),
        }
    }
}

/// Mock data-plane client.
#[derive(Debug, Default)]
pub struct MockDataPlaneClient {
    calls: Mutex<Vec<MockCall>>,
    script: Mutex<Script>,
}

impl MockDataPlaneClient {
    /// Create a client that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `check_availability` succeeds.
    pub fn set_available(&self, available: bool) {
        lock(&self.script).available = available;
    }

    /// Time every call takes before answering.
    pub fn set_delay(&self, delay: Duration) {
        lock(&self.script).delay = delay;
    }

    /// Result returned by `start`.
    pub fn set_start_result(&self, result: StatusResult<DataFlowResponseMessage>) {
        lock(&self.script).start = result;
    }

    /// Result returned by `suspend`.
    pub fn set_suspend_result(&self, result: StatusResult<()>) {
        lock(&self.script).suspend = result;
    }

    /// Result returned by `terminate`.
    pub fn set_terminate_result(&self, result: StatusResult<()>) {
        lock(&self.script).terminate = result;
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    async fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
        let delay = lock(&self.script).delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DataPlaneClient for MockDataPlaneClient {
    async fn start(
        &self,
        message: &DataFlowStartMessage,
    ) -> StatusResult<DataFlowResponseMessage> {
        self.record(MockCall::Start(message.process_id.clone())).await;
        lock(&self.script).start.clone()
    }

    async fn suspend(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()> {
        self.record(MockCall::Suspend(
            process_id.to_string(),
            reason.map(str::to_string),
        ))
        .await;
        lock(&self.script).suspend.clone()
    }

    async fn terminate(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()> {
        self.record(MockCall::Terminate(
            process_id.to_string(),
            reason.map(str::to_string),
        ))
        .await;
        lock(&self.script).terminate.clone()
    }

    async fn check_availability(&self) -> StatusResult<()> {
        self.record(MockCall::CheckAvailability).await;
        if lock(&self.script).available {
            Ok(())
        } else {
            Err(StatusFailure::retry("data plane not reachable"))
        }
    }
}

/// Factory handing out one [`MockDataPlaneClient`] per instance id.
#[derive(Debug, Default)]
pub struct MockDataPlaneClientFactory {
    clients: Mutex<HashMap<String, Arc<MockDataPlaneClient>>>,
}

impl MockDataPlaneClientFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Client for the instance with `id`, created on first use.
    #[must_use]
    pub fn client(&self, id: &str) -> Arc<MockDataPlaneClient> {
        Arc::clone(lock(&self.clients).entry(id.to_string()).or_default())
    }
}

impl DataPlaneClientFactory for MockDataPlaneClientFactory {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient> {
        self.client(&instance.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{instance, push_start_message};

    #[tokio::test]
    async fn test_mock_client_records_calls() {
        let client = MockDataPlaneClient::new();

        client.start(&push_start_message("p1")).await.unwrap();
        client.terminate("p1", Some("done")).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![
                MockCall::Start("p1".into()),
                MockCall::Terminate("p1".into(), Some("done".into()))
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_client_scripted_results() {
        let client = MockDataPlaneClient::new();
        client.set_available(false);
        client.set_suspend_result(Err(StatusFailure::fatal("nope")));
        client.set_terminate_result(Err(StatusFailure::retry("busy")));

        assert!(client.check_availability().await.unwrap_err().is_retryable());
        assert!(client.suspend("p1", None).await.is_err());
        assert!(client.terminate("p1", None).await.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_factory_shares_client_per_instance() {
        let factory = MockDataPlaneClientFactory::new();
        factory.client("dp-1").set_available(false);

        let client = factory.create_client(&instance("dp-1"));
        assert!(client.check_availability().await.is_err());
        assert_eq!(factory.client("dp-1").calls(), vec![MockCall::CheckAvailability]);
    }
}
