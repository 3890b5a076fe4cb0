//! Bearer-token authorization for PULL endpoints.

use async_trait::async_trait;
use dataplane_spi::{
    DataAddress, DataFlowStartMessage, DataPlaneAuthorizationService, StatusFailure, StatusResult,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// `type` of the endpoint data references issued here.
pub const EDR_TYPE: &str = "https://w3id.org/idsa/v4.1/HTTP";
/// EDR property holding the public endpoint.
pub const ENDPOINT: &str = "endpoint";
/// EDR property holding the authorization scheme.
pub const AUTH_TYPE: &str = "authType";
/// EDR property holding the access token.
pub const AUTHORIZATION: &str = "authorization";
/// EDR property holding the endpoint type.
pub const ENDPOINT_TYPE: &str = "endpointType";

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone)]
struct Grant {
    process_id: String,
    source: DataAddress,
}

/// Issues random bearer tokens for the public API and remembers what they
/// grant.
#[derive(Debug)]
pub struct TokenDataPlaneAuthorizationService {
    public_api_url: Url,
    grants: RwLock<HashMap<String, Grant>>,
}

impl TokenDataPlaneAuthorizationService {
    /// Create a service whose EDRs point at `public_api_url`.
    #[must_use]
    pub fn new(public_api_url: Url) -> Self {
        Self {
            public_api_url,
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live tokens.
    pub async fn active_tokens(&self) -> usize {
        self.grants.read().await.len()
    }

    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl DataPlaneAuthorizationService for TokenDataPlaneAuthorizationService {
    async fn create_endpoint_data_reference(
        &self,
        message: &DataFlowStartMessage,
    ) -> StatusResult<DataAddress> {
        let token = Self::generate_token();
        self.grants.write().await.insert(
            token.clone(),
            Grant {
                process_id: message.process_id.clone(),
                source: message.source_data_address.clone(),
            },
        );
        debug!(process_id = %message.process_id, "Endpoint data reference issued");

        Ok(DataAddress::new(EDR_TYPE)
            .with_property(ENDPOINT, self.public_api_url.as_str())
            .with_property(AUTH_TYPE, "bearer")
            .with_property(AUTHORIZATION, token)
            .with_property(ENDPOINT_TYPE, EDR_TYPE))
    }

    async fn authorize(&self, token: &str) -> StatusResult<DataAddress> {
        self.grants
            .read()
            .await
            .get(token)
            .map(|grant| grant.source.clone())
            .ok_or_else(|| StatusFailure::fatal("Token is not valid"))
    }

    async fn revoke(&self, process_id: &str) -> StatusResult<()> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|_, grant| grant.process_id != process_id);
        info!(process_id, revoked = before - grants.len(), "Access tokens revoked");
        Ok(())
    }
}
