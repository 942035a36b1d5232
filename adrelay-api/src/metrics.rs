//! Prometheus Metrics for adrelay
//!
//! Tracks handler outcomes, backend latency and overall HTTP traffic.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Metrics registry exposed at `/metrics`
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Extend-ad requests by outcome (`success` / `failure`)
pub static EXTEND_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("adrelay_extend_requests_total", "Total number of extend-ad requests"),
        &["outcome"],
    )
    .expect("metric can be created")
});

/// Backend mutation latency in seconds
pub static MUTATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "adrelay_mutation_duration_seconds",
            "Backend mutation call duration in seconds",
        ),
        &["outcome"],
    )
    .expect("metric can be created")
});

/// All HTTP requests served
pub static HTTP_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("adrelay_http_requests_total", "Total number of HTTP requests"),
        &["method", "status"],
    )
    .expect("metric can be created")
});

/// Initialize metrics
pub fn init() {
    // Already-registered errors are ignored so init can run more than once
    let _ = REGISTRY.register(Box::new(EXTEND_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MUTATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
}

/// Outcome label for a result
pub fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() { "success" } else { "failure" }
}

/// Gather metrics in Prometheus text format
pub fn gather() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
