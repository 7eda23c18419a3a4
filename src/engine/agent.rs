//! One polling cycle: connect, list, filter, dispatch, report.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use tracing::{Instrument, Span, info, warn};
use uuid::Uuid;

use super::dispatch::{DEFAULT_WORKERS, dispatch};
use super::filter::filter_changed;
use crate::cache::VersionCache;
use crate::config::{MarkPolicy, ProwConfig};
use crate::error::{CycleErrors, Error, Result};
use crate::lister::Connector;
use crate::model::TrackedResource;
use crate::sink::Sink;
use crate::telemetry::cycle::{record_phase, start_cycle_span};
use crate::telemetry::metrics;

/// Settings for one [`Agent`].
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub namespace: String,
    pub workers: usize,
    /// Bound on each connect, list, and persist call.
    pub call_timeout: Option<Duration>,
    pub mark_policy: MarkPolicy,
}

impl AgentConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            workers: DEFAULT_WORKERS,
            call_timeout: None,
            mark_policy: MarkPolicy::default(),
        }
    }
}

impl From<&ProwConfig> for AgentConfig {
    fn from(prow: &ProwConfig) -> Self {
        Self {
            namespace: prow.namespace.clone(),
            workers: prow.workers,
            call_timeout: prow.call_timeout(),
            mark_policy: prow.mark_seen,
        }
    }
}

/// Counts from a cycle in which every changed resource synced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub listed: usize,
    pub changed: usize,
    pub synced: usize,
}

/// Syncs ProwJobs from one namespace into a sink.
///
/// Owns the version cache; it lives as long as the agent does.
pub struct Agent {
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Sink>,
    cache: Arc<VersionCache>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(connector: Arc<dyn Connector>, sink: Arc<dyn Sink>, config: AgentConfig) -> Self {
        Self::with_cache(connector, sink, Arc::new(VersionCache::new()), config)
    }

    pub fn with_cache(
        connector: Arc<dyn Connector>,
        sink: Arc<dyn Sink>,
        cache: Arc<VersionCache>,
        config: AgentConfig,
    ) -> Self {
        Self {
            connector,
            sink,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<VersionCache> {
        &self.cache
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run a single cycle.
    ///
    /// Connect and list failures abort the cycle before anything is synced.
    /// Sync failures do not stop the rest of the batch; they are returned
    /// together as [`Error::Cycle`]. Resources that synced are kept even
    /// when the cycle as a whole fails.
    pub async fn run_once(&self) -> Result<CycleSummary> {
        let cycle_id = Uuid::new_v4();
        let span = start_cycle_span(&self.config.namespace, &cycle_id);
        let start = Instant::now();

        let result = self.cycle(&span).instrument(span.clone()).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(Error::Connect(_)) => "connect_error",
            Err(Error::List(_)) => "list_error",
            Err(_) => "sync_error",
        };
        metrics::cycles().add(1, &[KeyValue::new("outcome", outcome)]);
        metrics::cycle_duration_ms().record(start.elapsed().as_millis() as f64, &[]);

        result
    }

    async fn cycle(&self, span: &Span) -> Result<CycleSummary> {
        let namespace = self.config.namespace.as_str();
        let call_timeout = self.config.call_timeout;

        record_phase(span, "connecting");
        let lister = bounded("connect", call_timeout, self.connector.connect(namespace))
            .await
            .map_err(|e| Error::Connect(Box::new(e)))?;

        record_phase(span, "listing");
        let snapshot = bounded("list", call_timeout, lister.list(namespace))
            .await
            .map_err(|e| Error::List(Box::new(e)))?;
        let listed = snapshot.len();
        metrics::resources_listed().add(listed as u64, &[]);

        record_phase(span, "filtering");
        let batch = filter_changed(snapshot, &self.cache);
        let changed = batch.len();
        metrics::resources_changed().add(changed as u64, &[]);
        info!(listed, changed, cached = self.cache.len(), "filtered prowjobs");

        record_phase(span, "dispatching");
        let sink = Arc::clone(&self.sink);
        let cache = Arc::clone(&self.cache);
        let policy = self.config.mark_policy;
        let errors = dispatch(
            batch,
            move |resource| {
                sync_one(
                    Arc::clone(&sink),
                    Arc::clone(&cache),
                    policy,
                    call_timeout,
                    resource,
                )
            },
            self.config.workers,
        )
        .await;

        record_phase(span, "reporting");
        if !errors.is_empty() {
            warn!(failed = errors.len(), changed, "cycle finished with errors");
            return Err(Error::Cycle(CycleErrors(errors)));
        }

        Ok(CycleSummary {
            listed,
            changed,
            synced: changed,
        })
    }
}

/// Persist one resource and, per `policy`, record it as seen.
async fn sync_one(
    sink: Arc<dyn Sink>,
    cache: Arc<VersionCache>,
    policy: MarkPolicy,
    call_timeout: Option<Duration>,
    resource: TrackedResource,
) -> Result<()> {
    let outcome = bounded("persist", call_timeout, sink.persist(&resource)).await;
    match outcome {
        Ok(()) => {
            if policy == MarkPolicy::OnSuccess {
                cache.mark_seen(&resource.id, &resource.version);
            }
            metrics::resources_synced().add(1, &[KeyValue::new("result", "ok")]);
            Ok(())
        }
        Err(e) => {
            metrics::resources_synced().add(1, &[KeyValue::new("result", "error")]);
            Err(Error::Persist {
                id: resource.id,
                cause: Box::new(e),
            })
        }
    }
}

async fn bounded<T>(
    operation: &'static str,
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| Error::Timeout { operation, after })?,
        None => fut.await,
    }
}
