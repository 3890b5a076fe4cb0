//! Vault client settings.

use connector_common::{CircuitBreakerConfig, ConfigError, EnvSource, HttpConfig, RetryConfig};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Default KV v2 mount path.
pub const DEFAULT_SECRET_PATH: &str = "/v1/secret";
/// Default health endpoint.
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/v1/sys/health";
/// Default service-account token location.
pub const DEFAULT_K8S_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
/// Smallest accepted token TTL.
pub const MIN_TOKEN_TTL: Duration = Duration::from_secs(5);

/// How the client obtains its Vault token.
#[derive(Debug, Clone)]
pub enum VaultAuth {
    /// A static token.
    Token(SecretString),
    /// Kubernetes service-account login.
    Kubernetes {
        /// Vault role bound to the service account
        role: String,
        /// File holding the service-account JWT
        token_path: String,
    },
}

/// Vault client settings.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    /// Vault server address
    pub url: Url,
    /// Authentication method
    pub auth: VaultAuth,
    /// KV v2 mount path, e.g. `/v1/secret`
    pub secret_path: String,
    /// Health endpoint path
    pub health_check_path: String,
    /// Treat standby nodes as healthy
    pub health_check_standby_ok: bool,
    /// Run the token renewal task
    pub scheduled_token_renew_enabled: bool,
    /// Increment requested on each renewal
    pub token_ttl: Duration,
    /// Renew this long before the token expires
    pub token_renew_buffer: Duration,
    /// How long a previously resolved secret may stand in for an unreachable Vault
    pub fallback_grace_period: Duration,
    /// HTTP transport
    pub http: HttpConfig,
    /// Retry policy
    pub retry: RetryConfig,
    /// Circuit breaker
    pub circuit_breaker: CircuitBreakerConfig,
}

impl VaultSettings {
    /// Settings for token authentication with defaults for everything else.
    #[must_use]
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            auth: VaultAuth::Token(token),
            secret_path: DEFAULT_SECRET_PATH.to_string(),
            health_check_path: DEFAULT_HEALTH_CHECK_PATH.to_string(),
            health_check_standby_ok: false,
            scheduled_token_renew_enabled: true,
            token_ttl: Duration::from_secs(300),
            token_renew_buffer: Duration::from_secs(30),
            fallback_grace_period: Duration::from_secs(300),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }

    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value is
    /// malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource::process())
    }

    /// Load `VAULT_HASHICORP_*` variables from an arbitrary source.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value is
    /// malformed or out of range.
    pub fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let url = env.url("VAULT_HASHICORP_URL", None)?;
        let auth = match env.string("VAULT_HASHICORP_AUTH_METHOD", "token").to_ascii_lowercase().as_str() {
            "token" => VaultAuth::Token(SecretString::from(env.required("VAULT_HASHICORP_TOKEN")?)),
            "kubernetes" => VaultAuth::Kubernetes {
                role: env.required("VAULT_HASHICORP_K8S_ROLE")?,
                token_path: env.string("VAULT_HASHICORP_K8S_TOKEN_PATH", DEFAULT_K8S_TOKEN_PATH),
            },
            other => {
                return Err(ConfigError::invalid_value(
                    "VAULT_HASHICORP_AUTH_METHOD",
                    format!("unsupported auth method '{other}'"),
                ));
            }
        };

        let defaults = RetryConfig::default();
        let breaker = CircuitBreakerConfig::default();
        let settings = Self {
            url,
            auth,
            secret_path: env.string("VAULT_HASHICORP_API_SECRET_PATH", DEFAULT_SECRET_PATH),
            health_check_path: env
                .string("VAULT_HASHICORP_API_HEALTH_CHECK_PATH", DEFAULT_HEALTH_CHECK_PATH),
            health_check_standby_ok: env.parse("VAULT_HASHICORP_HEALTH_CHECK_STANDBY_OK", false)?,
            scheduled_token_renew_enabled: env
                .parse("VAULT_HASHICORP_TOKEN_SCHEDULED_RENEW_ENABLED", true)?,
            token_ttl: env.seconds("VAULT_HASHICORP_TOKEN_TTL", 300)?,
            token_renew_buffer: env.seconds("VAULT_HASHICORP_TOKEN_RENEW_BUFFER", 30)?,
            fallback_grace_period: env.seconds("VAULT_HASHICORP_FALLBACK_GRACE_PERIOD", 300)?,
            http: HttpConfig::default().with_timeout(env.seconds("VAULT_HASHICORP_TIMEOUT", 30)?),
            retry: defaults
                .clone()
                .with_max_retries(env.parse("VAULT_HASHICORP_MAX_RETRIES", defaults.max_retries)?),
            circuit_breaker: breaker
                .clone()
                .with_failure_threshold(
                    env.parse("VAULT_HASHICORP_CB_THRESHOLD", breaker.failure_threshold)?,
                )
                .with_timeout(env.seconds("VAULT_HASHICORP_CB_TIMEOUT", breaker.timeout.as_secs())?),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first value out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl < MIN_TOKEN_TTL {
            return Err(ConfigError::invalid_value(
                "VAULT_HASHICORP_TOKEN_TTL",
                format!("must be at least {}s", MIN_TOKEN_TTL.as_secs()),
            ));
        }
        if self.token_renew_buffer >= self.token_ttl {
            return Err(ConfigError::invalid_value(
                "VAULT_HASHICORP_TOKEN_RENEW_BUFFER",
                "must be smaller than the token TTL",
            ));
        }
        if self.http.timeout.is_zero() {
            return Err(ConfigError::invalid_value(
                "VAULT_HASHICORP_TIMEOUT",
                "must be greater than zero",
            ));
        }
        if !self.secret_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "VAULT_HASHICORP_API_SECRET_PATH",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Set the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: VaultAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Set the KV mount path.
    #[must_use]
    pub fn with_secret_path(mut self, path: impl Into<String>) -> Self {
        self.secret_path = path.into();
        self
    }

    /// Accept standby nodes as healthy.
    #[must_use]
    pub const fn with_health_check_standby_ok(mut self, ok: bool) -> Self {
        self.health_check_standby_ok = ok;
        self
    }

    /// Set token TTL and renew buffer.
    #[must_use]
    pub const fn with_token_renewal(mut self, ttl: Duration, renew_buffer: Duration) -> Self {
        self.token_ttl = ttl;
        self.token_renew_buffer = renew_buffer;
        self
    }

    /// Enable or disable the renewal task.
    #[must_use]
    pub const fn with_scheduled_token_renew(mut self, enabled: bool) -> Self {
        self.scheduled_token_renew_enabled = enabled;
        self
    }

    /// Set the fallback grace period.
    #[must_use]
    pub const fn with_fallback_grace_period(mut self, grace_period: Duration) -> Self {
        self.fallback_grace_period = grace_period;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the circuit breaker configuration.
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }
}
