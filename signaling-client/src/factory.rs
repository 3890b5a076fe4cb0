//! Client factory.

use crate::{DataPlaneSignalingClient, SignalingClientSettings};
use connector_common::{
    CircuitBreakerConfig, ConnectorError, ConnectorHttpClient, RetryPolicy, build_http_client,
};
use dataplane_spi::{DataPlaneClient, DataPlaneClientFactory, DataPlaneInstance};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use transform_core::TypeTransformerRegistry;

/// Creates signaling clients sharing one connection pool and registry.
///
/// Clients are cached per instance so that each instance keeps its own
/// circuit breaker across calls.
#[derive(Debug)]
pub struct DataPlaneSignalingClientFactory {
    http: reqwest::Client,
    retry: RetryPolicy,
    circuit_breaker: CircuitBreakerConfig,
    registry: Arc<TypeTransformerRegistry>,
    clients: Mutex<HashMap<String, Arc<DataPlaneSignalingClient>>>,
}

impl DataPlaneSignalingClientFactory {
    /// Create a factory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        settings: &SignalingClientSettings,
        registry: Arc<TypeTransformerRegistry>,
    ) -> Result<Self, ConnectorError> {
        Ok(Self {
            http: build_http_client(&settings.http)?,
            retry: RetryPolicy::new(settings.retry.clone()),
            circuit_breaker: settings.circuit_breaker.clone(),
            registry,
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Concrete client for `instance`.
    #[must_use]
    pub fn signaling_client(&self, instance: &DataPlaneInstance) -> Arc<DataPlaneSignalingClient> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&instance.id) {
            if client.instance().url == instance.url {
                return Arc::clone(client);
            }
        }

        debug!(id = %instance.id, url = %instance.url, "Creating data plane signaling client");
        let http = ConnectorHttpClient::from_client(
            format!("dataplane-{}", instance.id),
            self.http.clone(),
            self.retry.clone(),
        )
        .with_circuit_breaker(self.circuit_breaker.clone());
        let client = Arc::new(DataPlaneSignalingClient::new(
            http,
            Arc::clone(&self.registry),
            instance.clone(),
        ));
        clients.insert(instance.id.clone(), Arc::clone(&client));
        client
    }

    /// Request counters of every cached client, in Prometheus text format.
    #[must_use]
    pub fn prometheus_metrics(&self) -> String {
        let clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = clients.iter().collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries
            .into_iter()
            .map(|(_, client)| client.http().metrics().to_prometheus())
            .collect()
    }
}

impl DataPlaneClientFactory for DataPlaneSignalingClientFactory {
    fn create_client(&self, instance: &DataPlaneInstance) -> Arc<dyn DataPlaneClient> {
        self.signaling_client(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signaling_transform::signaling_transformer_registry;
    use test_utils::fixtures::instance;
    use url::Url;

    fn factory() -> DataPlaneSignalingClientFactory {
        DataPlaneSignalingClientFactory::new(
            &SignalingClientSettings::default(),
            Arc::new(signaling_transformer_registry()),
        )
        .unwrap()
    }

    #[test]
    fn test_clients_are_cached_per_instance() {
        let factory = factory();

        let a = factory.signaling_client(&instance("dp-1"));
        let b = factory.signaling_client(&instance("dp-1"));
        let c = factory.signaling_client(&instance("dp-2"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.http().service(), "dataplane-dp-1");
        assert!(a.http().circuit_breaker().is_some());
    }

    #[test]
    fn test_changed_url_replaces_client() {
        let factory = factory();

        let a = factory.signaling_client(&instance("dp-1"));
        let mut moved = instance("dp-1");
        moved.url = Url::parse("http://elsewhere:8183/v1/dataflows").unwrap();
        let b = factory.signaling_client(&moved);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.instance().url, moved.url);
    }

    #[test]
    fn test_prometheus_metrics_cover_cached_clients() {
        let factory = factory();
        assert!(factory.prometheus_metrics().is_empty());

        let _ = factory.signaling_client(&instance("dp-2"));
        let _ = factory.signaling_client(&instance("dp-1"));
        let text = factory.prometheus_metrics();

        assert!(text.contains("dataplane_dp_1_requests_total 0"));
        assert!(text.contains("dataplane_dp_2_requests_in_flight 0"));
        let first = text.find("dataplane_dp_1_").unwrap();
        let second = text.find("dataplane_dp_2_").unwrap();
        assert!(first < second);
    }
}
