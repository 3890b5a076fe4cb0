//! HTTP client for one data-plane instance.

use async_trait::async_trait;
use connector_common::error::is_retryable_status;
use connector_common::trace::{TRACEPARENT_HEADER, TRACESTATE_HEADER};
use connector_common::{ConnectorError, ConnectorHttpClient, TraceContext};
use dataplane_spi::{
    DataFlowResponseMessage, DataFlowStartMessage, DataFlowSuspendMessage,
    DataFlowTerminateMessage, DataPlaneClient, DataPlaneInstance, StatusFailure, StatusResult,
};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use transform_core::{JsonObject, TypeTransformerRegistry};
use url::Url;

/// Sends signaling messages to the instance's `url`.
///
/// Every request carries a `traceparent` header: a child of the configured
/// trace context, else of the task's current one, else a fresh root trace.
#[derive(Debug, Clone)]
pub struct DataPlaneSignalingClient {
    http: ConnectorHttpClient,
    registry: Arc<TypeTransformerRegistry>,
    instance: DataPlaneInstance,
    trace: Option<TraceContext>,
}

impl DataPlaneSignalingClient {
    /// Create a client for `instance`.
    #[must_use]
    pub fn new(
        http: ConnectorHttpClient,
        registry: Arc<TypeTransformerRegistry>,
        instance: DataPlaneInstance,
    ) -> Self {
        Self {
            http,
            registry,
            instance,
            trace: None,
        }
    }

    /// Continue the given trace on every request.
    #[must_use]
    pub fn with_trace_context(mut self, trace: TraceContext) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Target instance.
    #[must_use]
    pub const fn instance(&self) -> &DataPlaneInstance {
        &self.instance
    }

    /// Transport with its breaker and counters.
    #[must_use]
    pub const fn http(&self) -> &ConnectorHttpClient {
        &self.http
    }

    fn endpoint(&self, segments: &[&str]) -> StatusResult<Url> {
        let mut url = self.instance.url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StatusFailure::fatal(format!(
                    "Data plane url {} cannot carry a path",
                    self.instance.url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn serialize<T: 'static>(&self, message: &T, type_name: &str) -> StatusResult<JsonObject> {
        self.registry.transform(message).map_err(|failure| {
            StatusFailure::fatal(format!(
                "Error serializing {type_name} for data plane {}: {failure}",
                self.instance.id
            ))
        })
    }

    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<JsonObject>,
    ) -> StatusResult<String> {
        let trace = self
            .trace
            .clone()
            .or_else(TraceContext::current)
            .map_or_else(TraceContext::generate, |parent| parent.child());
        debug!(%url, trace_id = trace.trace_id(), "Sending {operation} request");

        let result = self
            .http
            .execute(|client| {
                let mut request = client
                    .request(method.clone(), url.clone())
                    .header(TRACEPARENT_HEADER, trace.traceparent.as_str());
                if let Some(state) = &trace.tracestate {
                    request = request.header(TRACESTATE_HEADER, state.as_str());
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }
                request
            })
            .await;

        let response = result.map_err(|e| self.transport_failure(operation, &e))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_success() {
            return Ok(text);
        }

        let message = format!(
            "{operation} request failed with status code {}: {text}",
            status.as_u16()
        );
        warn!(data_plane = %self.instance.id, status = status.as_u16(), "{message}");
        if status.is_client_error() {
            Err(StatusFailure::fatal(message))
        } else {
            Err(StatusFailure::retry(message))
        }
    }

    fn transport_failure(&self, operation: &str, error: &ConnectorError) -> StatusFailure {
        warn!(data_plane = %self.instance.id, error = %error, "{operation} request failed");
        match error {
            ConnectorError::Status { status, body } => {
                let message =
                    format!("{operation} request failed with status code {status}: {body}");
                if is_retryable_status(*status) {
                    StatusFailure::retry(message)
                } else {
                    StatusFailure::fatal(message)
                }
            }
            ConnectorError::CircuitOpen { .. }
            | ConnectorError::Unavailable(_)
            | ConnectorError::Timeout(_) => StatusFailure::retry(format!(
                "{operation} request to data plane {} failed: {error}",
                self.instance.id
            )),
            _ => StatusFailure::fatal(format!(
                "{operation} request to data plane {} failed: {error}",
                self.instance.id
            )),
        }
    }

    fn read_response(&self, body: &str) -> StatusResult<DataFlowResponseMessage> {
        if body.trim().is_empty() {
            return Ok(DataFlowResponseMessage::default());
        }
        let object = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                return Err(StatusFailure::fatal(format!(
                    "Data plane {} answered with a non-object body",
                    self.instance.id
                )));
            }
            Err(e) => {
                return Err(StatusFailure::fatal(format!(
                    "Error reading response from data plane {}: {e}",
                    self.instance.id
                )));
            }
        };
        self.registry.transform(&object).map_err(|failure| {
            StatusFailure::fatal(format!(
                "Error reading DataFlowResponseMessage from data plane {}: {failure}",
                self.instance.id
            ))
        })
    }
}

#[async_trait]
impl DataPlaneClient for DataPlaneSignalingClient {
    #[instrument(skip(self, message), fields(data_plane = %self.instance.id, process_id = %message.process_id))]
    async fn start(
        &self,
        message: &DataFlowStartMessage,
    ) -> StatusResult<DataFlowResponseMessage> {
        let body = self.serialize(message, "DataFlowStartMessage")?;
        let url = self.instance.url.clone();
        let response = self.send("Start", Method::POST, url, Some(body)).await?;
        self.read_response(&response)
    }

    #[instrument(skip(self), fields(data_plane = %self.instance.id))]
    async fn suspend(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()> {
        let message = DataFlowSuspendMessage {
            reason: reason.map(str::to_string),
        };
        let body = self.serialize(&message, "DataFlowSuspendMessage")?;
        let url = self.endpoint(&[process_id, "suspend"])?;
        self.send("Suspend", Method::POST, url, Some(body))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self), fields(data_plane = %self.instance.id))]
    async fn terminate(&self, process_id: &str, reason: Option<&str>) -> StatusResult<()> {
        let message = DataFlowTerminateMessage {
            reason: reason.map(str::to_string),
        };
        let body = self.serialize(&message, "DataFlowTerminateMessage")?;
        let url = self.endpoint(&[process_id, "terminate"])?;
        self.send("Terminate", Method::POST, url, Some(body))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self), fields(data_plane = %self.instance.id))]
    async fn check_availability(&self) -> StatusResult<()> {
        let url = self.endpoint(&["check"])?;
        self.send("Availability check", Method::GET, url, None)
            .await
            .map(|_| ())
    }
}
