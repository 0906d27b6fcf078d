//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog fetches (results, duration, snapshot size)
//! - Favorites mutations

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog fetches total by result.
pub static CATALOG_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookshelf_catalog_fetches_total", "Total catalog fetches"),
        &["result"], // "success", "network", "server", "decode", "cancelled"
    )
    .unwrap()
});

/// Catalog fetch duration in seconds.
pub static CATALOG_FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bookshelf_catalog_fetch_duration_seconds",
            "Duration of catalog fetches",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &[],
    )
    .unwrap()
});

/// Books in the currently published snapshot.
pub static CATALOG_BOOKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bookshelf_catalog_books",
        "Number of books in the current catalog snapshot",
    )
    .unwrap()
});

// =============================================================================
// Favorites Metrics
// =============================================================================

/// Favorites mutations total by operation and result.
pub static FAVORITES_MUTATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bookshelf_favorites_mutations_total",
            "Total favorites mutations",
        ),
        &["op", "result"], // op: "add", "remove"; result: "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_FETCHES.clone()),
        Box::new(CATALOG_FETCH_DURATION.clone()),
        Box::new(CATALOG_BOOKS.clone()),
        Box::new(FAVORITES_MUTATIONS.clone()),
    ]
}

/// Register every core metric into `registry`.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

/// Render a registry in the Prometheus text format.
pub fn gather_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
