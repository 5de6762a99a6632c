//! # Prometheus Metrics
//!
//! Exposes levelup operational metrics in the Prometheus text exposition format.
//!
//! ## Metrics Exposed
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `levelup_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |
//! | `levelup_stats_updates` | Counter | — | Successful XP updates |
//! | `levelup_objectives_created` | Counter | — | Objectives added |
//! | `levelup_objectives_toggled` | Counter | — | Completion toggles |
//! | `levelup_objectives_pruned` | Counter | — | Stale objectives deleted |
//!
//! The `/metrics` endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for HTTP request metrics. Paths are normalized before use.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

/// Thread-safe metrics registry.
///
/// All fields use atomic types and are safe to update from any async task.
pub struct Metrics {
    pub registry: Registry,
    pub http_request_duration: Family<HttpLabel, Histogram>,
    pub stats_updates: Counter,
    pub objectives_created: Counter,
    pub objectives_toggled: Counter,
    pub objectives_pruned: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_request_duration =
            Family::<HttpLabel, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 14))
            });
        registry.register(
            "levelup_http_request_duration_seconds",
            "HTTP request latency by method and path",
            http_request_duration.clone(),
        );

        let stats_updates = Counter::default();
        registry.register(
            "levelup_stats_updates",
            "Successful XP updates",
            stats_updates.clone(),
        );

        let objectives_created = Counter::default();
        registry.register(
            "levelup_objectives_created",
            "Objectives added",
            objectives_created.clone(),
        );

        let objectives_toggled = Counter::default();
        registry.register(
            "levelup_objectives_toggled",
            "Objective completion toggles",
            objectives_toggled.clone(),
        );

        let objectives_pruned = Counter::default();
        registry.register(
            "levelup_objectives_pruned",
            "Objectives deleted by the daily prune",
            objectives_pruned.clone(),
        );

        Self {
            registry,
            http_request_duration,
            stats_updates,
            objectives_created,
            objectives_toggled,
            objectives_pruned,
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        if let Err(e) = encode(&mut buf, &self.registry) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_encode_returns_valid_text() {
        let m = Metrics::new();
        m.stats_updates.inc();
        m.objectives_pruned.inc_by(3);
        m.http_request_duration
            .get_or_create(&HttpLabel {
                method: "GET".to_string(),
                path: "/api/stats".to_string(),
            })
            .observe(0.004);

        let output = m.encode();
        assert!(output.contains("levelup_stats_updates_total 1"));
        assert!(output.contains("levelup_objectives_pruned_total 3"));
        assert!(output.contains("levelup_http_request_duration_seconds"));
        assert!(output.contains("/api/stats"));
    }

    #[test]
    fn metrics_default_values_are_zero() {
        let output = Metrics::new().encode();
        assert!(output.contains("levelup_objectives_created_total 0"));
        assert!(output.contains("levelup_objectives_toggled_total 0"));
    }
}
