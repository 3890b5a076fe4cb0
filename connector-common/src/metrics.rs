//! Request counters in Prometheus text format.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name,
            self.help,
            self.name,
            self.name,
            self.get()
        )
    }
}

/// A value that goes up and down.
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Set the gauge value.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Increment the gauge by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the gauge by 1, stopping at zero.
    pub fn dec(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(1))
            });
    }

    /// Get the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} gauge\n{} {}\n",
            self.name,
            self.help,
            self.name,
            self.name,
            self.get()
        )
    }
}

/// Outbound request accounting for one remote service.
#[derive(Debug)]
pub struct RequestMetrics {
    /// Requests sent, retries included
    pub requests: Counter,
    /// Attempts that failed with a transport error or a retryable status
    pub failures: Counter,
    /// Requests rejected by an open circuit breaker
    pub rejected: Counter,
    /// Requests currently awaiting a response
    pub in_flight: Gauge,
}

impl RequestMetrics {
    /// Create request metrics with the given prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            requests: Counter::new(
                format!("{prefix}_requests_total"),
                "Total number of outbound requests",
            ),
            failures: Counter::new(
                format!("{prefix}_request_failures_total"),
                "Total number of failed outbound requests",
            ),
            rejected: Counter::new(
                format!("{prefix}_requests_rejected_total"),
                "Total number of requests rejected by the circuit breaker",
            ),
            in_flight: Gauge::new(
                format!("{prefix}_requests_in_flight"),
                "Number of outbound requests awaiting a response",
            ),
        }
    }

    /// Format all metrics as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{}{}{}",
            self.requests.to_prometheus(),
            self.failures.to_prometheus(),
            self.rejected.to_prometheus(),
            self.in_flight.to_prometheus()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new("test_counter", "A test counter");
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_gauge_never_underflows() {
        let gauge = Gauge::new("test_gauge", "A test gauge");
        gauge.dec();
        assert_eq!(gauge.get(), 0);

        gauge.set(2);
        gauge.inc();
        gauge.dec();
        assert_eq!(gauge.get(), 2);
    }

    #[test]
    fn test_request_metrics_prometheus_format() {
        let metrics = RequestMetrics::new("vault");
        metrics.requests.inc();
        metrics.requests.inc();
        metrics.requests.inc();
        metrics.failures.inc();

        let output = metrics.to_prometheus();
        assert!(output.contains("# TYPE vault_requests_total counter"));
        assert!(output.contains("vault_requests_total 3"));
        assert!(output.contains("vault_request_failures_total 1"));
        assert!(output.contains("vault_requests_in_flight 0"));
    }
}
