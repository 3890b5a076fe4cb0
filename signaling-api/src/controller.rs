//! `/v1/dataflows` routes.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dataplane_spi::{
    DataAddress, DataFlowStartMessage, DataFlowState, DataFlowSuspendMessage,
    DataFlowTerminateMessage, DataPlaneAuthorizationService, DataPlaneManager,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use transform_core::{JsonObject, TypeTransformerRegistry, short_type_name};

/// Base path of the signaling API.
pub const BASE_PATH: &str = "/v1/dataflows";

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct SignalingApiState {
    registry: Arc<TypeTransformerRegistry>,
    manager: Arc<dyn DataPlaneManager>,
    authorization: Arc<dyn DataPlaneAuthorizationService>,
}

impl std::fmt::Debug for SignalingApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingApiState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SignalingApiState {
    /// Bundle the collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<TypeTransformerRegistry>,
        manager: Arc<dyn DataPlaneManager>,
        authorization: Arc<dyn DataPlaneAuthorizationService>,
    ) -> Self {
        Self {
            registry,
            manager,
            authorization,
        }
    }

    fn read<T: 'static>(&self, body: Result<Json<JsonObject>, JsonRejection>) -> Result<T, ApiError> {
        let Json(body) = body.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
        self.registry.transform::<JsonObject, T>(&body).map_err(|failure| {
            warn!(
                target_type = short_type_name::<T>(),
                error = %failure,
                "Error transforming request body"
            );
            ApiError::from(failure)
        })
    }
}

/// Router serving the signaling API under [`BASE_PATH`].
pub fn router(state: SignalingApiState) -> Router {
    Router::new()
        .route("/v1/dataflows", post(start))
        .route("/v1/dataflows/check", get(check))
        .route("/v1/dataflows/{id}/state", get(transfer_state))
        .route("/v1/dataflows/{id}/terminate", post(terminate))
        .route("/v1/dataflows/{id}/suspend", post(suspend))
        .with_state(state)
}

#[instrument(skip_all)]
async fn start(
    State(state): State<SignalingApiState>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<Json<JsonObject>, ApiError> {
    let message: DataFlowStartMessage = state.read(body)?;

    state.manager.validate(&message).await.map_err(|failure| {
        warn!(process_id = %message.process_id, error = %failure, "Failed to validate request");
        if failure.messages.is_empty() {
            ApiError::invalid_request(format!("Failed to validate request: {}", message.id))
        } else {
            ApiError::from(failure)
        }
    })?;

    debug!(process_id = %message.process_id, "Create EDR");
    let data_address = state
        .authorization
        .create_endpoint_data_reference(&message)
        .await
        .map_err(|failure| {
            warn!(error = %failure, "Error obtaining EDR DataAddress");
            ApiError::from(failure)
        })?;

    let process_id = message.process_id.clone();
    if let Err(failure) = state.manager.initiate(message).await {
        if let Err(revoke) = state.authorization.revoke(&process_id).await {
            warn!(error = %revoke, "Failed to revoke access tokens of a flow that did not start");
        }
        return Err(failure.into());
    }

    state
        .registry
        .transform::<DataAddress, JsonObject>(&data_address)
        .map(Json)
        .map_err(|failure| {
            warn!(error = %failure, "Error transforming EDR DataAddress");
            ApiError::Internal(failure.detail())
        })
}

#[instrument(skip(state))]
async fn transfer_state(
    State(state): State<SignalingApiState>,
    Path(id): Path<String>,
) -> Result<Json<JsonObject>, ApiError> {
    let flow_state = state.manager.transfer_state(&id).await;
    state
        .registry
        .transform::<DataFlowState, JsonObject>(&flow_state)
        .map(Json)
        .map_err(|failure| ApiError::Internal(failure.detail()))
}

#[instrument(skip(state, body))]
async fn terminate(
    State(state): State<SignalingApiState>,
    Path(id): Path<String>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let message: DataFlowTerminateMessage = state.read(body)?;

    state.manager.terminate(&id, message.reason).await?;

    if let Err(failure) = state.authorization.revoke(&id).await {
        warn!(error = %failure, "Failed to revoke access tokens");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
async fn suspend(
    State(state): State<SignalingApiState>,
    Path(id): Path<String>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let _message: DataFlowSuspendMessage = state.read(body)?;

    warn!("A valid DataFlowSuspendMessage was provided, but suspension is not supported");
    Err(ApiError::NotImplemented(
        "suspending data flows is not supported".to_string(),
    ))
}

async fn check() -> StatusCode {
    StatusCode::NO_CONTENT
}
