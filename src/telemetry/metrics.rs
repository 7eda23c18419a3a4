//! Metric instrument factories for periscope.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"periscope"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for periscope instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("periscope")
}

/// Counter: polling cycles run.
/// Labels: `outcome` ("ok" | "connect_error" | "list_error" | "sync_error").
pub fn cycles() -> Counter<u64> {
    meter()
        .u64_counter("periscope.poll.cycles")
        .with_description("Number of polling cycles")
        .build()
}

/// Counter: resources returned by the lister.
pub fn resources_listed() -> Counter<u64> {
    meter()
        .u64_counter("periscope.resources.listed")
        .with_description("Resources returned by the lister")
        .build()
}

/// Counter: resources that passed the change filter.
pub fn resources_changed() -> Counter<u64> {
    meter()
        .u64_counter("periscope.resources.changed")
        .with_description("Resources changed since last sync")
        .build()
}

/// Counter: per-resource sync attempts.
/// Labels: `result` ("ok" | "error").
pub fn resources_synced() -> Counter<u64> {
    meter()
        .u64_counter("periscope.resources.synced")
        .with_description("Per-resource sync attempts")
        .build()
}

/// Counter: build rows written by the Postgres sink.
/// Labels: `result` ("inserted" | "duplicate").
pub fn builds_persisted() -> Counter<u64> {
    meter()
        .u64_counter("periscope.builds.persisted")
        .with_description("Build records written")
        .build()
}

/// Histogram: cycle duration in milliseconds.
pub fn cycle_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("periscope.poll.duration_ms")
        .with_description("Polling cycle duration in milliseconds")
        .with_unit("ms")
        .build()
}
