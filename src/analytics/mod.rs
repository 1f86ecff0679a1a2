// Query analytics
// Best-effort side channel; recording can never fail or affect the answer.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use tracing::info;

/// One answered (or fallback-answered) question.
#[derive(Debug, Clone)]
pub struct QueryEvent {
    pub query: String,
    pub result_count: usize,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub recorded_at: DateTime<Utc>,
}

impl QueryEvent {
    #[inline]
    pub fn new(query: &str, result_count: usize, latency_ms: u64, cache_hit: bool) -> Self {
        Self {
            query: query.to_string(),
            result_count,
            latency_ms,
            cache_hit,
            recorded_at: Utc::now(),
        }
    }
}

/// Sink for query events. `record` returns nothing and takes no `Result`,
/// so "logging failures are invisible to the user" holds structurally:
/// implementations must swallow their own errors.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: QueryEvent);
}

/// Logs events through the tracing subsystem.
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    #[inline]
    fn record(&self, event: QueryEvent) {
        info!(
            target: "docs_qa::analytics",
            query = %event.query,
            result_count = event.result_count,
            latency_ms = event.latency_ms,
            cache_hit = event.cache_hit,
            "answered question"
        );
    }
}

/// Discards all events; useful in tests.
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    #[inline]
    fn record(&self, _event: QueryEvent) {}
}
