//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("clipnest_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "clipnest_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("clipnest_db_queries_total", "Total number of database queries"),
        &["operation", "table"]
    ).expect("metric can be created");

    // Media host metrics
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("clipnest_media_uploads_total", "Total number of media host uploads"),
        &["kind", "status"]
    ).expect("metric can be created");
    pub static ref MEDIA_DELETES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("clipnest_media_deletes_total", "Total number of media host deletions"),
        &["status"]
    ).expect("metric can be created");

    // Error metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("clipnest_errors_total", "Total number of errors returned to clients"),
        &["error_type"]
    ).expect("metric can be created");

    // Application metrics
    pub static ref USERS_REGISTERED_TOTAL: IntCounter = IntCounter::new(
        "clipnest_users_registered_total",
        "Total number of user registrations"
    ).expect("metric can be created");
    pub static ref VIDEOS_PUBLISHED_TOTAL: IntCounter = IntCounter::new(
        "clipnest_videos_published_total",
        "Total number of videos published"
    ).expect("metric can be created");
}

/// Register all metrics with the global registry.
///
/// Call once during startup; duplicate registration is ignored so tests
/// that build multiple app instances stay quiet.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DB_QUERIES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MEDIA_UPLOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MEDIA_DELETES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(USERS_REGISTERED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(VIDEOS_PUBLISHED_TOTAL.clone()));
}
