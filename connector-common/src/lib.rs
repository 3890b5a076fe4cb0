//! Shared library for cross-cutting concerns in connector extensions.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - HTTP client configuration and a resilient request executor
//! - Retry policies with exponential backoff
//! - Circuit breaker pattern for resilience
//! - Environment-backed configuration helpers
//! - Request counters
//! - Tracing subscriber setup and W3C trace context propagation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod retry;
pub mod trace;
pub mod tracing_config;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use config::{ConfigError, EnvSource};
pub use error::ConnectorError;
pub use http::{ConnectorHttpClient, HttpConfig, build_http_client};
pub use metrics::{Counter, Gauge, RequestMetrics};
pub use retry::{RetryConfig, RetryPolicy, Retryable};
pub use trace::TraceContext;
pub use tracing_config::{TracingConfig, init_tracing};
