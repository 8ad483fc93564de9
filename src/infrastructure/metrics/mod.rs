//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Database query duration histograms
//! - Forum activity counters (posts, comments, likes, moderation actions)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace("forum"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("forum")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Database query duration histogram
pub static DB_QUERY_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];
    HistogramVec::new(
        HistogramOpts::new(
            "db_query_duration_seconds",
            "Database query latency in seconds",
        )
        .namespace("forum")
        .buckets(buckets),
        &["operation", "table"],
    )
    .expect("Failed to create DB_QUERY_DURATION_SECONDS metric")
});

/// Posts and comments created
pub static POSTS_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("posts_created_total", "Number of posts created").namespace("forum"),
        &["kind"], // "post", "comment"
    )
    .expect("Failed to create POSTS_CREATED_TOTAL metric")
});

/// Likes recorded (repeat likes are not counted)
pub static LIKES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new("likes_total", "Number of likes recorded").namespace("forum"))
        .expect("Failed to create LIKES_TOTAL metric")
});

/// Moderation actions by kind
pub static MODERATION_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("moderation_actions_total", "Number of moderation actions").namespace("forum"),
        &["action"],
    )
    .expect("Failed to create MODERATION_ACTIONS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
        .expect("Failed to register DB_QUERY_DURATION_SECONDS");
    registry
        .register(Box::new(POSTS_CREATED_TOTAL.clone()))
        .expect("Failed to register POSTS_CREATED_TOTAL");
    registry
        .register(Box::new(LIKES_TOTAL.clone()))
        .expect("Failed to register LIKES_TOTAL");
    registry
        .register(Box::new(MODERATION_ACTIONS_TOTAL.clone()))
        .expect("Failed to register MODERATION_ACTIONS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    Lazy::force(&REGISTRY);
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record database query metrics
pub fn record_db_query(operation: &str, table: &str, duration_secs: f64) {
    Lazy::force(&REGISTRY);
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(duration_secs);
}

/// Count a created post or comment
pub fn record_post_created(is_comment: bool) {
    Lazy::force(&REGISTRY);
    let kind = if is_comment { "comment" } else { "post" };
    POSTS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

/// Count a recorded like
pub fn record_like() {
    Lazy::force(&REGISTRY);
    LIKES_TOTAL.inc();
}

/// Count a moderation action ("flag_post", "flag_member", "mod_delete", "mute", "ban")
pub fn record_moderation(action: &str) {
    Lazy::force(&REGISTRY);
    MODERATION_ACTIONS_TOTAL.with_label_values(&[action]).inc();
}

/// Observes the elapsed time of a query when dropped.
pub struct DbTimer {
    operation: &'static str,
    table: &'static str,
    start: Instant,
}

impl DbTimer {
    pub fn start(operation: &'static str, table: &'static str) -> Self {
        Self {
            operation,
            table,
            start: Instant::now(),
        }
    }
}

impl Drop for DbTimer {
    fn drop(&mut self) {
        record_db_query(self.operation, self.table, self.start.elapsed().as_secs_f64());
    }
}
