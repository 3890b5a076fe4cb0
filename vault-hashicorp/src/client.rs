//! Vault HTTP client with retry, circuit breaker and fallback cache.

use crate::{
    config::{VaultAuth, VaultSettings},
    error::{VaultError, VaultResult},
    provider::{SecretMetadata, Vault},
    secrets::{
        AuthResponse, CONTENT_FIELD, HealthResponse, HealthStatus, KubernetesLoginRequest,
        KvContent, KvResponse, KvWriteRequest, KvWriteResponse, TokenLookupData,
        TokenLookupResponse, TokenRenewRequest,
    },
};
use async_trait::async_trait;
use connector_common::{CircuitState, ConnectorHttpClient, RequestMetrics, RetryPolicy};
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Header carrying the Vault token.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

const TOKEN_LOOKUP_PATH: &str = "/v1/auth/token/lookup-self";
const TOKEN_RENEW_PATH: &str = "/v1/auth/token/renew-self";
const KUBERNETES_LOGIN_PATH: &str = "/v1/auth/kubernetes/login";

struct CachedToken {
    token: SecretString,
    expires_at: Option<Instant>,
}

struct CachedSecret {
    value: SecretString,
    fetched_at: Instant,
}

/// Vault KV v2 client.
pub struct VaultClient {
    settings: VaultSettings,
    http: ConnectorHttpClient,
    token: RwLock<Option<CachedToken>>,
    fallback: RwLock<HashMap<String, CachedSecret>>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("url", &self.settings.url.as_str())
            .field("secret_path", &self.settings.secret_path)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidConfig`] when the settings are out of range or
    /// the HTTP client cannot be built.
    pub fn new(settings: VaultSettings) -> VaultResult<Self> {
        settings
            .validate()
            .map_err(|e| VaultError::InvalidConfig(e.to_string()))?;

        let http = ConnectorHttpClient::new(
            "vault",
            &settings.http,
            RetryPolicy::new(settings.retry.clone()),
        )
        .map_err(|e| VaultError::InvalidConfig(e.to_string()))?
        .with_circuit_breaker(settings.circuit_breaker.clone());

        let token = match &settings.auth {
            VaultAuth::Token(token) => Some(CachedToken {
                token: token.clone(),
                expires_at: None,
            }),
            VaultAuth::Kubernetes { .. } => None,
        };

        Ok(Self {
            settings,
            http,
            token: RwLock::new(token),
            fallback: RwLock::new(HashMap::new()),
        })
    }

    /// Settings this client runs with.
    #[must_use]
    pub const fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Outbound request counters, renderable as Prometheus text.
    #[must_use]
    pub fn metrics(&self) -> &RequestMetrics {
        self.http.metrics()
    }

    /// Current circuit breaker state.
    pub async fn circuit_state(&self) -> Option<CircuitState> {
        match self.http.circuit_breaker() {
            Some(breaker) => Some(breaker.state().await),
            None => None,
        }
    }

    /// Log in with the Kubernetes service-account JWT and cache the token.
    ///
    /// A no-op for token authentication.
    ///
    /// # Errors
    ///
    /// [`VaultError::AuthenticationFailed`] when the JWT cannot be read or
    /// Vault refuses the login.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> VaultResult<()> {
        let VaultAuth::Kubernetes { role, token_path } = &self.settings.auth else {
            return Ok(());
        };

        let jwt = tokio::fs::read_to_string(token_path)
            .await
            .map_err(|e| VaultError::auth_failed(format!("cannot read {token_path}: {e}")))?;
        let body = serde_json::to_value(KubernetesLoginRequest {
            role,
            jwt: jwt.trim(),
        })?;

        let url = self.endpoint(KUBERNETES_LOGIN_PATH)?;
        let response = self
            .http
            .execute(|client| client.post(url.clone()).json(&body))
            .await
            .map_err(|e| VaultError::from_connector(e, KUBERNETES_LOGIN_PATH))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(VaultError::auth_failed(format!("Status {status}: {text}")));
        }

        let auth: AuthResponse = read_json(response).await?;
        let ttl = Duration::from_secs(auth.auth.lease_duration);
        *self.token.write().await = Some(CachedToken {
            token: SecretString::from(auth.auth.client_token),
            expires_at: Some(Instant::now() + ttl),
        });

        info!(role = %role, ttl_secs = ttl.as_secs(), "Authenticated with Vault");
        Ok(())
    }

    async fn current_token(&self) -> VaultResult<SecretString> {
        {
            let token = self.token.read().await;
            if let Some(cached) = token.as_ref() {
                let fresh = cached.expires_at.is_none_or(|expires_at| {
                    expires_at.saturating_duration_since(Instant::now())
                        > self.settings.token_renew_buffer
                });
                if fresh {
                    return Ok(cached.token.clone());
                }
            }
        }

        self.authenticate().await?;
        self.token
            .read()
            .await
            .as_ref()
            .map(|cached| cached.token.clone())
            .ok_or_else(|| VaultError::auth_failed("No token available"))
    }

    fn endpoint(&self, path: &str) -> VaultResult<Url> {
        let base = self.settings.url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| VaultError::InvalidConfig(format!("invalid Vault URL: {e}")))
    }

    /// Each key segment is percent-encoded on its own, so a key can never
    /// add a query, a fragment or a parent directory to the mount path.
    fn kv_endpoint(&self, section: &str, key: &str) -> VaultResult<Url> {
        let mount = self.settings.secret_path.trim_end_matches('/');
        let mut url = self.endpoint(&format!("{mount}/{section}"))?;
        url.path_segments_mut()
            .map_err(|()| VaultError::InvalidConfig("Vault URL cannot carry a path".to_string()))?
            .extend(key.split('/'));
        Ok(url)
    }

    /// Authenticated request; any non-success status becomes an error.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        path: &str,
    ) -> VaultResult<Response> {
        let token = self.current_token().await?;

        let response = self
            .http
            .execute(|client| {
                let request = client
                    .request(method.clone(), url.clone())
                    .header(VAULT_TOKEN_HEADER, token.expose_secret());
                match body {
                    Some(body) => request.json(body),
                    None => request,
                }
            })
            .await
            .map_err(|e| VaultError::from_connector(e, path))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(VaultError::from_status(status.as_u16(), path, text))
        }
    }

    /// Read the latest version of `key` as `T`.
    ///
    /// # Errors
    ///
    /// [`VaultError::SecretNotFound`] if the key does not exist, otherwise
    /// whatever the request or deserialization produced.
    #[instrument(skip(self))]
    pub async fn read_secret<T>(&self, key: &str) -> VaultResult<(T, SecretMetadata)>
    where
        T: DeserializeOwned + Send,
    {
        validate_key(key)?;
        let url = self.kv_endpoint("data", key)?;
        self.read_kv(url, key).await
    }

    /// Read a specific version of `key` as `T`.
    ///
    /// # Errors
    ///
    /// As [`read_secret`](Self::read_secret).
    #[instrument(skip(self))]
    pub async fn read_secret_version<T>(
        &self,
        key: &str,
        version: u64,
    ) -> VaultResult<(T, SecretMetadata)>
    where
        T: DeserializeOwned + Send,
    {
        validate_key(key)?;
        let mut url = self.kv_endpoint("data", key)?;
        url.query_pairs_mut()
            .append_pair("version", &version.to_string());
        self.read_kv(url, key).await
    }

    async fn read_kv<T>(&self, url: Url, key: &str) -> VaultResult<(T, SecretMetadata)>
    where
        T: DeserializeOwned + Send,
    {
        let response = self.send(Method::GET, url, None, key).await?;
        let kv: KvResponse<T> = read_json(response).await?;

        let metadata = SecretMetadata::from_version(&kv.data.metadata).with_lease(
            kv.lease_id,
            kv.lease_duration,
            kv.renewable,
        );
        Ok((kv.data.data, metadata))
    }

    async fn cached(&self, key: &str) -> Option<String> {
        let grace = self.settings.fallback_grace_period;
        self.fallback
            .read()
            .await
            .get(key)
            .filter(|cached| cached.fetched_at.elapsed() <= grace)
            .map(|cached| cached.value.expose_secret().to_string())
    }

    /// Query the health endpoint.
    ///
    /// Answers with whatever status Vault returned; only transport failures
    /// are errors. Not retried and not guarded by the circuit breaker.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unavailable`] if Vault cannot be reached.
    #[instrument(skip(self))]
    pub async fn health(&self) -> VaultResult<HealthResponse> {
        let mut url = self.endpoint(&self.settings.health_check_path)?;
        if self.settings.health_check_standby_ok {
            url.query_pairs_mut()
                .append_pair("standbyok", "true")
                .append_pair("perfstandbyok", "true");
        }

        let response = self
            .http
            .inner()
            .get(url)
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .ok()
            .and_then(|bytes| serde_json::from_slice::<HealthStatus>(&bytes).ok());
        let health = HealthResponse::new(status, body, self.settings.health_check_standby_ok);

        debug!(status, healthy = health.is_healthy(), "Vault health checked");
        Ok(health)
    }

    /// Look up the client's own token.
    ///
    /// # Errors
    ///
    /// Whatever the request produced.
    #[instrument(skip(self))]
    pub async fn look_up_token(&self) -> VaultResult<TokenLookupData> {
        let url = self.endpoint(TOKEN_LOOKUP_PATH)?;
        let response = self.send(Method::GET, url, None, TOKEN_LOOKUP_PATH).await?;
        let lookup: TokenLookupResponse = read_json(response).await?;
        Ok(lookup.data)
    }

    /// Renew the client's own token by the configured TTL.
    ///
    /// Returns the TTL Vault granted.
    ///
    /// # Errors
    ///
    /// [`VaultError::TokenRenewalFailed`] on any failure.
    #[instrument(skip(self))]
    pub async fn renew_token(&self) -> VaultResult<Duration> {
        let body = serde_json::to_value(TokenRenewRequest {
            increment: format!("{}s", self.settings.token_ttl.as_secs()),
        })?;
        let url = self.endpoint(TOKEN_RENEW_PATH)?;

        let auth = async {
            let response = self
                .send(Method::POST, url, Some(&body), TOKEN_RENEW_PATH)
                .await?;
            read_json::<AuthResponse>(response).await
        }
        .await
        .map_err(|e| VaultError::TokenRenewalFailed(e.to_string()))?;

        let ttl = Duration::from_secs(auth.auth.lease_duration);
        if let Some(cached) = self.token.write().await.as_mut() {
            if cached.expires_at.is_some() {
                cached.expires_at = Some(Instant::now() + ttl);
            }
        }
        debug!(ttl_secs = ttl.as_secs(), "Vault token renewed");
        Ok(ttl)
    }
}

#[async_trait]
impl Vault for VaultClient {
    #[instrument(skip(self))]
    async fn resolve_secret(&self, key: &str) -> VaultResult<Option<String>> {
        match self.read_secret::<serde_json::Map<String, Value>>(key).await {
            Ok((data, _)) => {
                let Some(value) = data.get(CONTENT_FIELD).and_then(Value::as_str) else {
                    debug!(key, "Secret has no '{CONTENT_FIELD}' field");
                    return Ok(None);
                };
                self.fallback.write().await.insert(
                    key.to_string(),
                    CachedSecret {
                        value: SecretString::from(value.to_string()),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(Some(value.to_string()))
            }
            Err(VaultError::SecretNotFound(_)) => {
                self.fallback.write().await.remove(key);
                debug!(key, "Secret not found");
                Ok(None)
            }
            Err(e) if e.allows_fallback() => match self.cached(key).await {
                Some(value) => {
                    warn!(key, error = %e, "Vault unavailable, serving cached secret");
                    Ok(Some(value))
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, value))]
    async fn store_secret(&self, key: &str, value: &str) -> VaultResult<SecretMetadata> {
        validate_key(key)?;
        let body = serde_json::to_value(KvWriteRequest {
            data: KvContent { content: value },
        })?;
        let url = self.kv_endpoint("data", key)?;

        let response = self.send(Method::POST, url, Some(&body), key).await?;
        let written: KvWriteResponse = read_json(response).await?;
        self.fallback.write().await.remove(key);

        info!(key, version = written.data.version, "Secret stored");
        Ok(SecretMetadata::from_version(&written.data))
    }

    #[instrument(skip(self))]
    async fn delete_secret(&self, key: &str) -> VaultResult<()> {
        validate_key(key)?;
        let url = self.kv_endpoint("metadata", key)?;

        self.send(Method::DELETE, url, None, key).await?;
        self.fallback.write().await.remove(key);

        info!(key, "Secret deleted");
        Ok(())
    }
}

/// Reject keys that would escape the KV mount.
///
/// # Errors
///
/// [`VaultError::InvalidInput`] for empty keys, keys starting with `/`,
/// keys containing `..`, `%`, `?`, `#` or a backslash, and keys with an empty or
/// `.` segment.
pub fn validate_key(key: &str) -> VaultResult<()> {
    if key.is_empty() {
        return Err(VaultError::invalid_input("secret key must not be empty"));
    }
    if key.starts_with('/') {
        return Err(VaultError::invalid_input(format!(
            "secret key '{key}' must not start with '/'"
        )));
    }
    if key.contains("..") {
        return Err(VaultError::invalid_input(format!(
            "secret key '{key}' must not contain '..'"
        )));
    }
    if let Some(c) = key.chars().find(|c| matches!(c, '%' | '?' | '#' | '\\')) {
        return Err(VaultError::invalid_input(format!(
            "secret key '{key}' must not contain '{c}'"
        )));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == ".") {
        return Err(VaultError::invalid_input(format!(
            "secret key '{key}' has an empty or '.' segment"
        )));
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> VaultResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| VaultError::unavailable(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector_common::{CircuitBreakerConfig, RetryConfig};
    use serde_json::json;
    use test_utils::fixtures::{
        vault_auth_response, vault_health_response, vault_kv_response, vault_token_lookup_response,
        vault_write_response,
    };
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> VaultSettings {
        VaultSettings::new(
            Url::parse(&server.uri()).unwrap(),
            SecretString::from("s.test-token".to_string()),
        )
        .with_retry(
            RetryConfig::default()
                .with_max_retries(2)
                .with_initial_delay(Duration::from_millis(1))
                .without_jitter(),
        )
    }

    fn client(server: &MockServer) -> VaultClient {
        VaultClient::new(settings(server)).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_secret_reads_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/my-key"))
            .and(header(VAULT_TOKEN_HEADER, "s.test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("s3cr3t", 1)))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server).resolve_secret("my-key").await.unwrap();

        assert_eq!(value.as_deref(), Some("s3cr3t"));
    }

    #[tokio::test]
    async fn test_resolve_missing_secret_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).resolve_secret("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_without_content_field_is_none() {
        let server = MockServer::start().await;
        let mut body = vault_kv_response("ignored", 1);
        body["data"]["data"] = json!({ "username": "admin" });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        assert_eq!(client(&server).resolve_secret("no-content").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("sealed"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server).resolve_secret("my-key").await.unwrap_err();

        assert!(matches!(err, VaultError::Unavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_metrics_count_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client = client(&server);

        let _ = client.resolve_secret("my-key").await;

        assert_eq!(client.metrics().requests.get(), 3);
        assert_eq!(client.metrics().failures.get(), 3);
        assert_eq!(client.metrics().in_flight.get(), 0);
        let text = client.metrics().to_prometheus();
        assert!(text.contains("vault_requests_total 3"));
        assert!(text.contains("vault_requests_in_flight 0"));
    }

    #[tokio::test]
    async fn test_forbidden_is_not_retried_nor_counted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(6)
            .mount(&server)
            .await;
        let client = client(&server);

        for _ in 0..6 {
            let err = client.resolve_secret("my-key").await.unwrap_err();
            assert!(matches!(err, VaultError::PermissionDenied(_)));
        }

        assert_eq!(client.circuit_state().await, Some(CircuitState::Closed));
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;
        let client = VaultClient::new(
            settings(&server)
                .with_retry(RetryConfig::default().with_max_retries(0))
                .with_circuit_breaker(CircuitBreakerConfig::default().with_failure_threshold(2)),
        )
        .unwrap();

        for _ in 0..2 {
            assert!(matches!(
                client.resolve_secret("k").await,
                Err(VaultError::Unavailable(_))
            ));
        }

        assert!(matches!(
            client.resolve_secret("k").await,
            Err(VaultError::CircuitBreakerOpen)
        ));
        assert_eq!(client.circuit_state().await, Some(CircuitState::Open));
    }

    #[tokio::test]
    async fn test_fallback_serves_cached_value_within_grace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("cached", 1)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client = client(&server);

        assert_eq!(client.resolve_secret("k").await.unwrap().as_deref(), Some("cached"));
        assert_eq!(client.resolve_secret("k").await.unwrap().as_deref(), Some("cached"));
        assert!(client.resolve_secret("other").await.is_err());
    }

    #[tokio::test]
    async fn test_fallback_expires_after_grace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("cached", 1)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client =
            VaultClient::new(settings(&server).with_fallback_grace_period(Duration::ZERO)).unwrap();

        client.resolve_secret("k").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(
            client.resolve_secret("k").await,
            Err(VaultError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_read_secret_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/db"))
            .and(query_param("version", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("v2", 2)))
            .expect(1)
            .mount(&server)
            .await;

        let (data, metadata): (serde_json::Map<String, Value>, _) =
            client(&server).read_secret_version("db", 2).await.unwrap();

        assert_eq!(data["content"], "v2");
        assert_eq!(metadata.version, Some(2));
        assert!(metadata.created_time.is_some());
    }

    #[tokio::test]
    async fn test_store_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/secret/data/my-key"))
            .and(body_json(json!({ "data": { "content": "value" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_write_response(7)))
            .expect(1)
            .mount(&server)
            .await;

        let metadata = client(&server).store_secret("my-key", "value").await.unwrap();

        assert_eq!(metadata.version, Some(7));
    }

    #[tokio::test]
    async fn test_delete_secret_removes_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/secret/metadata/my-key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).delete_secret("my-key").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_keys_never_reach_vault() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("leak", 1)))
            .expect(0)
            .mount(&server)
            .await;
        let client = client(&server);

        let keys = [
            "",
            "/abs",
            "a/../b",
            "team#other",
            "team?x=1",
            "%2e%2e/%2e%2e/sys/mounts",
            "a//b",
            "./a",
            "a/",
            "a\\..",
        ];
        for key in keys {
            assert!(
                matches!(client.resolve_secret(key).await, Err(VaultError::InvalidInput(_))),
                "{key} was accepted"
            );
            assert!(matches!(
                client.delete_secret(key).await,
                Err(VaultError::InvalidInput(_))
            ));
            assert!(matches!(
                client.store_secret(key, "v").await,
                Err(VaultError::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_key_segments_stay_under_mount() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/team/db-password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("nested", 1)))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server);

        assert_eq!(
            client.resolve_secret("team/db-password").await.unwrap().as_deref(),
            Some("nested")
        );
        let url = client.kv_endpoint("metadata", "a b/c").unwrap();
        assert_eq!(url.path(), "/v1/secret/metadata/a%20b/c");
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn test_health_reports_any_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .respond_with(ResponseTemplate::new(503).set_body_json(vault_health_response(true, false)))
            .expect(1)
            .mount(&server)
            .await;

        let health = client(&server).health().await.unwrap();

        assert_eq!(health.status, 503);
        assert!(!health.is_healthy());
        assert_eq!(health.body.map(|b| b.sealed), Some(true));
    }

    #[tokio::test]
    async fn test_health_standby_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sys/health"))
            .and(query_param("standbyok", "true"))
            .and(query_param("perfstandbyok", "true"))
            .respond_with(ResponseTemplate::new(429).set_body_json(vault_health_response(false, true)))
            .mount(&server)
            .await;
        let client =
            VaultClient::new(settings(&server).with_health_check_standby_ok(true)).unwrap();

        assert!(client.health().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn test_look_up_and_renew_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_token_lookup_response(120, true)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .and(body_json(json!({ "increment": "300s" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_auth_response("s.test-token", 300)))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server);

        let lookup = client.look_up_token().await.unwrap();
        assert_eq!(lookup.ttl(), Duration::from_secs(120));
        assert!(lookup.renewable);

        assert_eq!(client.renew_token().await.unwrap(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_renew_failure_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).renew_token().await,
            Err(VaultError::TokenRenewalFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_kubernetes_login() {
        let server = MockServer::start().await;
        let jwt_path = std::env::temp_dir().join(format!("vault-k8s-jwt-{}", std::process::id()));
        std::fs::write(&jwt_path, "header.payload.signature\n").unwrap();

        Mock::given(method("POST"))
            .and(path("/v1/auth/kubernetes/login"))
            .and(body_json(json!({ "role": "connector", "jwt": "header.payload.signature" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_auth_response("s.k8s", 3600)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/data/k"))
            .and(header(VAULT_TOKEN_HEADER, "s.k8s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_kv_response("v", 1)))
            .expect(2)
            .mount(&server)
            .await;

        let client = VaultClient::new(settings(&server).with_auth(VaultAuth::Kubernetes {
            role: "connector".to_string(),
            token_path: jwt_path.to_string_lossy().into_owned(),
        }))
        .unwrap();

        assert_eq!(client.resolve_secret("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(client.resolve_secret("k").await.unwrap().as_deref(), Some("v"));

        let _ = std::fs::remove_file(jwt_path);
    }

    #[tokio::test]
    async fn test_kubernetes_login_without_jwt_fails() {
        let server = MockServer::start().await;
        let client = VaultClient::new(settings(&server).with_auth(VaultAuth::Kubernetes {
            role: "connector".to_string(),
            token_path: "/nonexistent/token".to_string(),
        }))
        .unwrap();

        assert!(matches!(
            client.resolve_secret("k").await,
            Err(VaultError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let settings = VaultSettings::new(
            Url::parse("http://vault:8200").unwrap(),
            SecretString::from("s.hidden".to_string()),
        );
        let client = VaultClient::new(settings).unwrap();
        assert!(!format!("{client:?}").contains("s.hidden"));
    }
}
