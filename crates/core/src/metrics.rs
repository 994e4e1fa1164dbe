//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Generation pipeline (jobs processed, durations)
//! - Upstream Mojang calls
//! - Retention and downloads

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Generation Metrics
// =============================================================================

/// Jobs processed total by result.
pub static JOBS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skinforge_jobs_processed_total", "Total jobs processed"),
        &["result"], // "ready", "failed"
    )
    .unwrap()
});

/// Generation duration in seconds.
pub static GENERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "skinforge_generation_duration_seconds",
            "Duration of pack generation",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Skins resolved per job.
pub static SKINS_RESOLVED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "skinforge_skins_resolved",
            "Number of skins resolved per job",
        )
        .buckets(vec![1.0, 2.0, 5.0, 10.0, 15.0, 20.0]),
    )
    .unwrap()
});

/// Names dropped because Mojang did not recognize them.
pub static NAMES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skinforge_names_dropped_total",
        "Total requested names that did not resolve to a profile",
    )
    .unwrap()
});

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream request duration.
pub static UPSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "skinforge_upstream_duration_seconds",
            "Duration of Mojang API calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"], // "lookup", "profile", "texture"
    )
    .unwrap()
});

/// Upstream requests total.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "skinforge_upstream_requests_total",
            "Total Mojang API requests",
        ),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Retention and Download Metrics
// =============================================================================

/// Jobs evicted by retention.
pub static JOBS_EVICTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skinforge_jobs_evicted_total",
        "Total jobs evicted by retention",
    )
    .unwrap()
});

/// Packs downloaded.
pub static PACKS_DOWNLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skinforge_packs_downloaded_total",
        "Total pack archives downloaded",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_PROCESSED.clone()),
        Box::new(GENERATION_DURATION.clone()),
        Box::new(SKINS_RESOLVED.clone()),
        Box::new(NAMES_DROPPED.clone()),
        Box::new(UPSTREAM_DURATION.clone()),
        Box::new(UPSTREAM_REQUESTS.clone()),
        Box::new(JOBS_EVICTED.clone()),
        Box::new(PACKS_DOWNLOADED.clone()),
    ]
}
