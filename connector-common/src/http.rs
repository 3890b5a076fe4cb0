//! Centralized HTTP client configuration and a resilient request executor.
//!
//! [`ConnectorHttpClient`] wraps a reqwest client with the retry policy, an
//! optional circuit breaker and request counters. Responses with a
//! non-retryable status are handed back to the caller untouched; transport
//! failures and retryable statuses (429, 5xx) are retried and surface as
//! [`ConnectorError`] once the policy gives up.

use crate::{
    CircuitBreaker, CircuitBreakerConfig, ConnectorError, Gauge, RequestMetrics, RetryPolicy,
    error::is_retryable_status,
};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout (default: 30s)
    pub timeout: Duration,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 90s)
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: concat!("connector-extensions/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
///
/// # Examples
///
/// ```
/// use connector_common::{HttpConfig, build_http_client};
/// use std::time::Duration;
///
/// let config = HttpConfig::default().with_timeout(Duration::from_secs(60));
/// let client = build_http_client(&config).expect("Failed to build client");
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}

/// HTTP client with retry, circuit breaking and request accounting.
#[derive(Debug, Clone)]
pub struct ConnectorHttpClient {
    client: Client,
    retry: RetryPolicy,
    breaker: Option<Arc<CircuitBreaker>>,
    metrics: Arc<RequestMetrics>,
    service: String,
}

impl ConnectorHttpClient {
    /// Create a client for the named remote service.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new(
        service: impl Into<String>,
        config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConnectorError> {
        Ok(Self::from_client(service, build_http_client(config)?, retry))
    }

    /// Wrap an existing reqwest client.
    #[must_use]
    pub fn from_client(service: impl Into<String>, client: Client, retry: RetryPolicy) -> Self {
        let service = service.into();
        Self {
            client,
            retry,
            breaker: None,
            metrics: Arc::new(RequestMetrics::new(&metric_prefix(&service))),
            service,
        }
    }

    /// Guard every request with a circuit breaker.
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = Some(Arc::new(CircuitBreaker::new(self.service.clone(), config)));
        self
    }

    /// The underlying reqwest client.
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }

    /// The circuit breaker, when configured.
    #[must_use]
    pub fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        self.breaker.as_deref()
    }

    /// Request counters.
    #[must_use]
    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Name of the remote service.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Send a request, retrying transient failures.
    ///
    /// `build` is invoked once per attempt.
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::CircuitOpen`] if the breaker rejects the call
    /// - [`ConnectorError::Unavailable`] / [`ConnectorError::Timeout`] for
    ///   transport failures that outlived the retry policy
    /// - [`ConnectorError::Status`] for a retryable status that outlived the
    ///   retry policy
    pub async fn execute<F>(&self, build: F) -> Result<Response, ConnectorError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        self.retry.execute(|| self.attempt(&build)).await
    }

    async fn attempt<F>(&self, build: &F) -> Result<Response, ConnectorError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        if let Some(breaker) = &self.breaker {
            if !breaker.allow_request().await {
                self.metrics.rejected.inc();
                return Err(ConnectorError::circuit_open(&self.service));
            }
        }

        self.metrics.requests.inc();
        let outcome = {
            let _in_flight = InFlight::enter(&self.metrics.in_flight);
            build(&self.client).send().await
        };

        let result = match outcome {
            Ok(response) if is_retryable_status(response.status().as_u16()) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                Err(ConnectorError::Status { status, body })
            }
            Ok(response) => Ok(response),
            Err(err) if err.is_builder() => return Err(ConnectorError::Http(err)),
            Err(err) => Err(ConnectorError::from_transport(&err)),
        };

        match &result {
            Ok(response) => {
                debug!(service = %self.service, status = response.status().as_u16(), "Request completed");
                if let Some(breaker) = &self.breaker {
                    breaker.record_success().await;
                }
            }
            Err(err) => {
                self.metrics.failures.inc();
                debug!(service = %self.service, error = %err, "Request attempt failed");
                if let Some(breaker) = &self.breaker {
                    breaker.record_failure().await;
                }
            }
        }

        result
    }
}

/// Holds one unit of the in-flight gauge until dropped, so a cancelled
/// request is released too.
struct InFlight<'a>(&'a Gauge);

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a Gauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

fn metric_prefix(service: &str) -> String {
    service
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CircuitState, RetryConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(max_retries: u32) -> ConnectorHttpClient {
        let retry = RetryPolicy::new(
            RetryConfig::default()
                .with_max_retries(max_retries)
                .with_initial_delay(Duration::from_millis(1))
                .without_jitter(),
        );
        ConnectorHttpClient::new("test-service", &HttpConfig::default(), retry).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert!(config.user_agent.starts_with("connector-extensions/"));
    }

    #[test]
    fn test_build_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_metric_prefix_is_sanitized() {
        assert_eq!(metric_prefix("Data-Plane signaling"), "data_plane_signaling");
    }

    #[tokio::test]
    async fn test_non_retryable_status_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let http = client(3);
        let url = format!("{}/missing", server.uri());
        let response = http.execute(|c| c.get(&url)).await.unwrap();

        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(http.metrics().requests.get(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_request_leaves_nothing_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let http = client(0);
        let url = format!("{}/slow", server.uri());
        let mut pending = Box::pin(http.execute(|c| c.get(&url)));

        let waited = tokio::time::timeout(Duration::from_millis(100), &mut pending).await;
        assert!(waited.is_err());
        assert_eq!(http.metrics().in_flight.get(), 1);

        drop(pending);
        assert_eq!(http.metrics().in_flight.get(), 0);
        assert_eq!(http.metrics().requests.get(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(3)
            .mount(&server)
            .await;

        let http = client(2);
        let url = format!("{}/flaky", server.uri());
        let err = http.execute(|c| c.get(&url)).await.unwrap_err();

        assert!(matches!(err, ConnectorError::Status { status: 503, ref body } if body == "maintenance"));
        assert_eq!(http.metrics().failures.get(), 3);
    }

    #[tokio::test]
    async fn test_breaker_opens_and_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let http = client(0).with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(2)
                .with_timeout(Duration::from_secs(60)),
        );
        let url = server.uri();

        for _ in 0..2 {
            assert!(http.execute(|c| c.get(&url)).await.is_err());
        }

        let err = http.execute(|c| c.get(&url)).await.unwrap_err();
        assert!(matches!(err, ConnectorError::CircuitOpen { .. }));
        assert_eq!(
            http.circuit_breaker().unwrap().state().await,
            CircuitState::Open
        );
        assert_eq!(http.metrics().rejected.get(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let http = client(0);
        let err = http
            .execute(|c| c.get("http://127.0.0.1:9/unreachable"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
