//! Signaling client settings.

use connector_common::{CircuitBreakerConfig, ConfigError, EnvSource, HttpConfig, RetryConfig};
use dataplane_selector::DEFAULT_STRATEGY;
use std::time::Duration;

/// Settings for the signaling client stack.
#[derive(Debug, Clone)]
pub struct SignalingClientSettings {
    /// Strategy used when the caller names none
    pub selection_strategy: String,
    /// HTTP transport
    pub http: HttpConfig,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
    /// Circuit breaker per data-plane instance
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for SignalingClientSettings {
    fn default() -> Self {
        Self {
            selection_strategy: DEFAULT_STRATEGY.to_string(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl SignalingClientSettings {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource::process())
    }

    /// Load from an arbitrary source.
    ///
    /// Reads `SIGNALING_SELECTION_STRATEGY`, `SIGNALING_TIMEOUT`,
    /// `SIGNALING_MAX_RETRIES`, `SIGNALING_CB_THRESHOLD` and
    /// `SIGNALING_CB_TIMEOUT`.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but malformed.
    pub fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout = env.seconds("SIGNALING_TIMEOUT", defaults.http.timeout.as_secs())?;
        if timeout.is_zero() {
            return Err(ConfigError::invalid_value(
                "SIGNALING_TIMEOUT",
                "must be greater than zero",
            ));
        }

        let max_retries = env.parse("SIGNALING_MAX_RETRIES", defaults.retry.max_retries)?;

        Ok(Self {
            selection_strategy: env.string("SIGNALING_SELECTION_STRATEGY", DEFAULT_STRATEGY),
            http: defaults.http.with_timeout(timeout),
            retry: defaults.retry.with_max_retries(max_retries),
            circuit_breaker: defaults
                .circuit_breaker
                .with_failure_threshold(env.parse(
                    "SIGNALING_CB_THRESHOLD",
                    CircuitBreakerConfig::default().failure_threshold,
                )?)
                .with_timeout(env.seconds(
                    "SIGNALING_CB_TIMEOUT",
                    CircuitBreakerConfig::default().timeout.as_secs(),
                )?),
        })
    }

    /// Set the default selection strategy.
    #[must_use]
    pub fn with_selection_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.selection_strategy = strategy.into();
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
