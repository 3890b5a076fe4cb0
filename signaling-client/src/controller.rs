//! Data-flow controller: selects a data plane and signals it.

use connector_common::TraceContext;
use dataplane_selector::DataPlaneSelectorService;
use dataplane_spi::{
    DataAddress, DataFlowStartMessage, DataPlaneClientFactory, StatusFailure, StatusResult,
};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of a started flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFlowResponse {
    /// Endpoint data reference returned by the data plane, if any
    pub data_address: Option<DataAddress>,
    /// Instance running the flow
    pub data_plane_id: String,
}

/// Dispatches data flows to data planes.
#[derive(Clone)]
pub struct DataFlowController {
    selector: DataPlaneSelectorService,
    factory: Arc<dyn DataPlaneClientFactory>,
    default_strategy: String,
}

impl std::fmt::Debug for DataFlowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFlowController")
            .field("selector", &self.selector)
            .field("default_strategy", &self.default_strategy)
            .finish_non_exhaustive()
    }
}

impl DataFlowController {
    /// Create a controller.
    #[must_use]
    pub fn new(
        selector: DataPlaneSelectorService,
        factory: Arc<dyn DataPlaneClientFactory>,
        default_strategy: impl Into<String>,
    ) -> Self {
        Self {
            selector,
            factory,
            default_strategy: default_strategy.into(),
        }
    }

    /// The selector backing this controller.
    #[must_use]
    pub const fn selector(&self) -> &DataPlaneSelectorService {
        &self.selector
    }

    /// Select a data plane for `message` and start the flow there.
    ///
    /// # Errors
    ///
    /// `FATAL_ERROR` when no data plane qualifies; otherwise whatever the
    /// data plane answered.
    #[instrument(skip(self, message, trace), fields(process_id = %message.process_id))]
    pub async fn start(
        &self,
        message: &DataFlowStartMessage,
        strategy: Option<&str>,
        trace: Option<&TraceContext>,
    ) -> StatusResult<DataFlowResponse> {
        let transfer_type = (!message.transfer_type.destination_type.is_empty())
            .then(|| message.transfer_type.to_string());
        let strategy = strategy.unwrap_or(&self.default_strategy);

        let instance = self
            .selector
            .select(
                &message.source_data_address,
                transfer_type.as_deref(),
                Some(strategy),
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "No data plane selected");
                StatusFailure::fatal(format!(
                    "Failed to select the data plane for transfer process {}: {e}",
                    message.process_id
                ))
            })?;

        let client = self.factory.create_client(&instance);
        let response = within(trace, client.start(message)).await?;
        info!(data_plane = %instance.id, "Data flow started");

        Ok(DataFlowResponse {
            data_address: response.data_address,
            data_plane_id: instance.id,
        })
    }

    /// Suspend a flow on the data plane running it.
    ///
    /// # Errors
    ///
    /// `FATAL_ERROR` for an unknown data plane; otherwise whatever the data
    /// plane answered.
    #[instrument(skip(self, trace))]
    pub async fn suspend(
        &self,
        process_id: &str,
        data_plane_id: &str,
        reason: Option<&str>,
        trace: Option<&TraceContext>,
    ) -> StatusResult<()> {
        let client = self.client_for(data_plane_id).await?;
        within(trace, client.suspend(process_id, reason)).await
    }

    /// Terminate a flow on the data plane running it.
    ///
    /// # Errors
    ///
    /// `FATAL_ERROR` for an unknown data plane; otherwise whatever the data
    /// plane answered.
    #[instrument(skip(self, trace))]
    pub async fn terminate(
        &self,
        process_id: &str,
        data_plane_id: &str,
        reason: Option<&str>,
        trace: Option<&TraceContext>,
    ) -> StatusResult<()> {
        let client = self.client_for(data_plane_id).await?;
        within(trace, client.terminate(process_id, reason)).await
    }

    /// Union of the transfer types all registered data planes support.
    pub async fn transfer_types(&self) -> BTreeSet<String> {
        self.selector
            .get_all()
            .await
            .into_iter()
            .flat_map(|instance| instance.allowed_transfer_types)
            .collect()
    }

    async fn client_for(
        &self,
        data_plane_id: &str,
    ) -> StatusResult<Arc<dyn dataplane_spi::DataPlaneClient>> {
        let instance = self
            .selector
            .find_by_id(data_plane_id)
            .await
            .ok_or_else(|| {
                StatusFailure::fatal(format!("Data plane instance {data_plane_id} not found"))
            })?;
        Ok(self.factory.create_client(&instance))
    }
}

/// Run `future` with `trace` as the task's current trace context.
async fn within<F: Future>(trace: Option<&TraceContext>, future: F) -> F::Output {
    match trace {
        Some(trace) => trace.clone().scope(future).await,
        None => future.await,
    }
}
