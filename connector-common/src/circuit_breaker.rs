//! Circuit breaker implementation for resilience.
//!
//! Protects callers from hammering a remote dependency that keeps failing.
//! All transitions happen under a single lock so the state and its counters
//! always move together.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, requests are allowed
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, limited requests are allowed to test recovery
    HalfOpen,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Number of consecutive successes in half-open state to close the circuit
    pub success_threshold: u32,
    /// Time to wait before transitioning from open to half-open
    pub timeout: Duration,
    /// Maximum requests allowed in half-open state
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(30),
            half_open_max_requests: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure threshold (at least 1).
    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Set the success threshold (at least 1).
    #[must_use]
    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold.max(1);
        self
    }

    /// Set the open-state timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of trial requests admitted while half-open.
    #[must_use]
    pub fn with_half_open_max_requests(mut self, max: u32) -> Self {
        self.half_open_max_requests = max.max(1);
        self
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    half_open_requests: u32,
    opened_at: Option<Instant>,
}

impl Inner {
    const fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            half_open_requests: 0,
            opened_at: None,
        }
    }

    fn trip(&mut self) {
        self.state = CircuitState::Open;
        self.successes = 0;
        self.half_open_requests = 0;
        self.opened_at = Some(Instant::now());
    }
}

/// Circuit breaker guarding one remote service.
///
/// - Closed: normal operation; consecutive failures are counted
/// - Open: every request is rejected until `timeout` has elapsed
/// - Half-Open: up to `half_open_max_requests` trial requests; one failure
///   re-opens, `success_threshold` successes close
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker for the named service.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner::closed()),
        }
    }

    /// Create a circuit breaker with default configuration.
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// Name of the guarded service.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a request is allowed.
    ///
    /// Returns `true` if the request should proceed, `false` if it should be rejected.
    pub async fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .is_some_and(|opened| opened.elapsed() >= self.config.timeout);
                if elapsed {
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    inner.half_open_requests = 1;
                    info!(service = %self.name, "Circuit breaker half-open, probing");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_requests < self.config.half_open_max_requests {
                    inner.half_open_requests += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request.
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => inner.failures = 0,
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    *inner = Inner::closed();
                    info!(service = %self.name, "Circuit breaker closed");
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed request.
    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;
                if inner.failures >= self.config.failure_threshold {
                    inner.trip();
                    warn!(
                        service = %self.name,
                        failures = inner.failures,
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.failures += 1;
                inner.trip();
                warn!(service = %self.name, "Circuit breaker re-opened after failed trial request");
            }
            CircuitState::Open => {}
        }
    }

    /// Get the current circuit state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Get the current consecutive failure count.
    pub async fn failure_count(&self) -> u32 {
        self.inner.lock().await.failures
    }

    /// Reset the circuit breaker to closed state.
    pub async fn reset(&self) {
        *self.inner.lock().await = Inner::closed();
    }
}
