//! Telemetry installation and the polling cycle span.

use periscope::error::Error;
use periscope::telemetry::cycle::{record_phase, start_cycle_span};
use periscope::telemetry::{TelemetryConfig, init_telemetry};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};
use uuid::Uuid;

/// Records span names and every value written to `poll.phase`.
#[derive(Clone, Default)]
struct Captured {
    spans: Arc<Mutex<Vec<String>>>,
    phases: Arc<Mutex<Vec<String>>>,
}

struct PhaseVisitor<'a>(&'a Mutex<Vec<String>>);

impl Visit for PhaseVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "poll.phase" {
            self.0.lock().unwrap().push(value.to_string());
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> Layer<S> for Captured {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.spans.lock().unwrap().push(attrs.metadata().name().to_string());
    }

    fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        values.record(&mut PhaseVisitor(&self.phases));
    }
}

fn config(json_logs: bool) -> TelemetryConfig {
    TelemetryConfig {
        endpoint: None,
        service_name: "periscope-test".to_string(),
        log_level: "debug".to_string(),
        json_logs,
    }
}

#[test]
fn subscriber_installs_once_per_process() {
    let first = init_telemetry(config(false));
    assert!(first.is_ok());

    let second = init_telemetry(config(true));
    assert!(
        matches!(&second, Err(Error::Other(msg)) if msg.contains("subscriber")),
        "a second global subscriber must be rejected"
    );
}

#[test]
fn cycle_span_is_live_and_records_each_phase() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());

    tracing::subscriber::with_default(subscriber, || {
        let span = start_cycle_span("ci", &Uuid::new_v4());
        assert!(!span.is_disabled());
        assert_eq!(span.metadata().map(|m| m.name()), Some("poll.cycle"));

        record_phase(&span, "listing");
        record_phase(&span, "dispatching");
    });

    assert_eq!(*captured.spans.lock().unwrap(), vec!["poll.cycle"]);
    assert_eq!(*captured.phases.lock().unwrap(), vec!["listing", "dispatching"]);
}

#[test]
fn metric_instruments_work_without_a_provider() {
    periscope::telemetry::metrics::cycles().add(1, &[]);
    periscope::telemetry::metrics::resources_listed().add(3, &[]);
    periscope::telemetry::metrics::cycle_duration_ms().record(12.5, &[]);
}
