//! W3C Trace Context propagation for outbound requests.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::future::Future;

/// Header carrying the trace parent.
pub const TRACEPARENT_HEADER: &str = "traceparent";
/// Header carrying vendor trace state.
pub const TRACESTATE_HEADER: &str = "tracestate";

tokio::task_local! {
    static CURRENT: TraceContext;
}

/// W3C Trace Context for distributed tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// W3C traceparent header value
    pub traceparent: String,
    /// Optional tracestate header value
    pub tracestate: Option<String>,
}

impl TraceContext {
    /// Create a trace context from a raw traceparent value.
    #[must_use]
    pub fn new(traceparent: impl Into<String>) -> Self {
        Self {
            traceparent: traceparent.into(),
            tracestate: None,
        }
    }

    /// Start a new sampled root trace.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!(
            "00-{}-{}-01",
            random_hex::<16>(),
            random_hex::<8>()
        ))
    }

    /// Parse a received header, discarding malformed values.
    #[must_use]
    pub fn parse(traceparent: &str, tracestate: Option<&str>) -> Option<Self> {
        let ctx = Self {
            traceparent: traceparent.trim().to_ascii_lowercase(),
            tracestate: tracestate.map(str::to_string),
        };
        ctx.is_valid().then_some(ctx)
    }

    /// Attach a tracestate value.
    #[must_use]
    pub fn with_tracestate(mut self, tracestate: impl Into<String>) -> Self {
        self.tracestate = Some(tracestate.into());
        self
    }

    /// Check if traceparent is valid W3C format.
    /// Format: version-trace_id-parent_id-flags (00-{32hex}-{16hex}-{2hex})
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let parts: Vec<&str> = self.traceparent.split('-').collect();
        let [version, trace_id, parent_id, flags] = parts[..] else {
            return false;
        };

        let hex = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit());
        hex(version, 2)
            && hex(trace_id, 32)
            && hex(parent_id, 16)
            && hex(flags, 2)
            && trace_id.chars().any(|c| c != '0')
            && parent_id.chars().any(|c| c != '0')
    }

    /// Get the trace ID from traceparent.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.traceparent.split('-').nth(1)
    }

    /// Get the parent span ID from traceparent.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.traceparent.split('-').nth(2)
    }

    /// Check if trace is sampled (flag bit 0 set).
    #[must_use]
    pub fn is_sampled(&self) -> bool {
        self.traceparent
            .split('-')
            .nth(3)
            .and_then(|f| u8::from_str_radix(f, 16).ok())
            .is_some_and(|f| f & 0x01 != 0)
    }

    /// Continue the trace with a fresh span id, as done for every outbound hop.
    #[must_use]
    pub fn child(&self) -> Self {
        self.propagate(&random_hex::<8>())
    }

    /// Continue the trace with the given span id.
    #[must_use]
    pub fn propagate(&self, new_span_id: &str) -> Self {
        let parts: Vec<&str> = self.traceparent.split('-').collect();
        if parts.len() != 4 {
            return self.clone();
        }

        Self {
            traceparent: format!("{}-{}-{}-{}", parts[0], parts[1], new_span_id, parts[3]),
            tracestate: self.tracestate.clone(),
        }
    }

    /// Run `future` with this context as the task's current trace.
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        CURRENT.scope(self, future).await
    }

    /// Trace set by an enclosing [`scope`](Self::scope), if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }
}

fn random_hex<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    if bytes.iter().all(|b| *b == 0) {
        bytes[N - 1] = 1;
    }
    bytes.iter().fold(String::with_capacity(N * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

    #[tokio::test]
    async fn test_scope_sets_current() {
        assert_eq!(TraceContext::current(), None);

        let trace = TraceContext::new(SAMPLE);
        let seen = trace.clone().scope(async { TraceContext::current() }).await;

        assert_eq!(seen, Some(trace));
        assert_eq!(TraceContext::current(), None);
    }

    #[test]
    fn test_valid_traceparent() {
        let ctx = TraceContext::new(SAMPLE);
        assert!(ctx.is_valid());
        assert_eq!(ctx.trace_id(), Some("0af7651916cd43dd8448eb211c80319c"));
        assert_eq!(ctx.parent_id(), Some("b7ad6b7169203331"));
        assert!(ctx.is_sampled());
    }

    #[test]
    fn test_invalid_traceparent() {
        assert!(!TraceContext::new("invalid").is_valid());
        assert!(
            !TraceContext::new("00-00000000000000000000000000000000-b7ad6b7169203331-01")
                .is_valid()
        );
        assert!(TraceContext::parse("00-xyz-abc-01", None).is_none());
    }

    #[test]
    fn test_generated_context_is_valid_and_sampled() {
        let ctx = TraceContext::generate();
        assert!(ctx.is_valid());
        assert!(ctx.is_sampled());
        assert_ne!(ctx.trace_id(), TraceContext::generate().trace_id());
    }

    #[test]
    fn test_child_keeps_trace_id() {
        let ctx = TraceContext::new(SAMPLE).with_tracestate("vendor=1");
        let child = ctx.child();

        assert!(child.is_valid());
        assert_eq!(child.trace_id(), ctx.trace_id());
        assert_ne!(child.parent_id(), ctx.parent_id());
        assert_eq!(child.tracestate.as_deref(), Some("vendor=1"));
    }

    #[test]
    fn test_propagation() {
        let ctx = TraceContext::new(SAMPLE);
        let propagated = ctx.propagate("1234567890abcdef");

        assert!(propagated.is_valid());
        assert_eq!(propagated.parent_id(), Some("1234567890abcdef"));
    }
}
