//! Data-plane signaling API.
//!
//! Serves the data-plane side of the signaling protocol under
//! `/v1/dataflows`: start, state, terminate, suspend and availability check.
//! Ships with an in-memory [`InMemoryDataPlaneManager`] and a bearer-token
//! [`TokenDataPlaneAuthorizationService`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorization;
pub mod controller;
pub mod error;
pub mod manager;
pub mod settings;
pub mod shutdown;

pub use authorization::TokenDataPlaneAuthorizationService;
pub use controller::{BASE_PATH, SignalingApiState, router};
pub use error::ApiError;
pub use manager::InMemoryDataPlaneManager;
pub use settings::SignalingApiSettings;

use signaling_transform::signaling_transformer_registry;
use std::sync::Arc;

/// State wired with the in-memory manager and token authorization.
#[must_use]
pub fn default_state(settings: &SignalingApiSettings) -> SignalingApiState {
    SignalingApiState::new(
        Arc::new(signaling_transformer_registry()),
        Arc::new(InMemoryDataPlaneManager::new()),
        Arc::new(TokenDataPlaneAuthorizationService::new(
            settings.public_api_url.clone(),
        )),
    )
}
