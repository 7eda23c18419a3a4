//! Polling cycle span helpers.
//!
//! One span per cycle; phase changes are recorded as events on it.

use tracing::Span;
use uuid::Uuid;

/// Start a span for one polling cycle.
///
/// The `poll.phase` field is declared empty and is updated via
/// [`record_phase`].
pub fn start_cycle_span(namespace: &str, cycle_id: &Uuid) -> Span {
    tracing::info_span!(
        "poll.cycle",
        "poll.namespace" = namespace,
        "poll.cycle_id" = %cycle_id,
        "poll.phase" = tracing::field::Empty,
    )
}

/// Record entry into a new phase on the given span.
pub fn record_phase(span: &Span, phase: &str) {
    span.record("poll.phase", phase);
    span.in_scope(|| {
        tracing::debug!(phase = phase, "phase");
    });
}
