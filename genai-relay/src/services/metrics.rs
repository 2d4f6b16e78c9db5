//! Prometheus metrics for genai-relay.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

struct RelayMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    provider_latency_seconds: HistogramVec,
    upload_bytes_total: IntCounterVec,
}

static METRICS: OnceLock<RelayMetrics> = OnceLock::new();

fn metrics() -> &'static RelayMetrics {
    METRICS.get_or_init(|| {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("relay_requests_total", "Total number of generation requests"),
            &["route", "status"],
        )
        .expect("Failed to create relay_requests_total metric");

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "relay_provider_latency_seconds",
                "Model provider round-trip latency in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["route"],
        )
        .expect("Failed to create relay_provider_latency_seconds metric");

        let upload_bytes_total = IntCounterVec::new(
            Opts::new("relay_upload_bytes_total", "Total bytes of staged uploads"),
            &["route"],
        )
        .expect("Failed to create relay_upload_bytes_total metric");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("Failed to register relay_requests_total");
        registry
            .register(Box::new(provider_latency_seconds.clone()))
            .expect("Failed to register relay_provider_latency_seconds");
        registry
            .register(Box::new(upload_bytes_total.clone()))
            .expect("Failed to register relay_upload_bytes_total");

        RelayMetrics {
            registry,
            requests_total,
            provider_latency_seconds,
            upload_bytes_total,
        }
    })
}

/// Register all metrics. Safe to call more than once.
pub fn init_metrics() {
    metrics();
}

pub fn record_request(route: &str, status: u16) {
    let status = status.to_string();
    metrics()
        .requests_total
        .with_label_values(&[route, status.as_str()])
        .inc();
}

pub fn observe_provider_latency(route: &str, seconds: f64) {
    metrics()
        .provider_latency_seconds
        .with_label_values(&[route])
        .observe(seconds);
}

pub fn record_upload_bytes(route: &str, bytes: u64) {
    metrics()
        .upload_bytes_total
        .with_label_values(&[route])
        .inc_by(bytes);
}

/// Render the registry in the Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = metrics().registry.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_exposition() {
        init_metrics();
        record_request("unit-test", 200);
        record_upload_bytes("unit-test", 42);
        observe_provider_latency("unit-test", 0.3);

        let output = get_metrics();
        assert!(output.contains("relay_requests_total{route=\"unit-test\",status=\"200\"}"));
        assert!(output.contains("relay_upload_bytes_total{route=\"unit-test\"}"));
        assert!(output.contains("relay_provider_latency_seconds_bucket"));
    }
}
