//! Fan-out of a work batch over a fixed pool of worker tasks.
//!
//! Shutdown ordering matters here: the work queue is closed as soon as the
//! batch is enqueued so idle workers can exit, all workers are joined, and
//! only then is the error channel closed and drained. Reading errors before
//! the join (or never closing either channel) never returns.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, warn};

use crate::error::{Error, Result};
use crate::model::TrackedResource;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 20;

/// Run `sink_fn` once per item in `batch` on `workers` concurrent tasks.
///
/// Returns every error `sink_fn` produced, in the order they were reported.
/// No item is skipped when another fails. `workers` is clamped to at least 1.
pub async fn dispatch<F, Fut>(batch: Vec<TrackedResource>, sink_fn: F, workers: usize) -> Vec<Error>
where
    F: Fn(TrackedResource) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let workers = workers.max(1);
    let mut errors = Vec::new();

    // Capacity covers the whole batch so enqueueing never waits on a worker.
    let (work_tx, work_rx) = mpsc::channel::<TrackedResource>(batch.len().max(1));
    let batch_len = batch.len();
    for item in batch {
        if let Err(mpsc::error::TrySendError::Full(item) | mpsc::error::TrySendError::Closed(item)) =
            work_tx.try_send(item)
        {
            errors.push(Error::Worker(format!("could not enqueue {}", item.id)));
        }
    }
    drop(work_tx);

    debug!(items = batch_len, workers, "dispatching batch");

    let work_rx = Arc::new(Mutex::new(work_rx));
    let (err_tx, mut err_rx) = mpsc::unbounded_channel::<Error>();
    let sink_fn = Arc::new(sink_fn);

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        let work_rx = Arc::clone(&work_rx);
        let err_tx = err_tx.clone();
        let sink_fn = Arc::clone(&sink_fn);
        pool.spawn(
            async move {
                loop {
                    let next = work_rx.lock().await.recv().await;
                    let Some(item) = next else {
                        break;
                    };
                    let id = item.id.clone();
                    // Each item runs on its own task so a panic costs that item only.
                    let outcome = match tokio::spawn(sink_fn(item).in_current_span()).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!(%id, error = %e, "item task did not complete");
                            Err(Error::Worker(format!("{id}: {e}")))
                        }
                    };
                    if let Err(e) = outcome {
                        debug!(%id, error = %e, "item failed");
                        // The receiver outlives every worker.
                        let _ = err_tx.send(e);
                    }
                }
            }
            .instrument(tracing::debug_span!("worker", worker)),
        );
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "worker task did not complete");
            let _ = err_tx.send(Error::Worker(e.to_string()));
        }
    }

    drop(err_tx);
    while let Some(e) = err_rx.recv().await {
        errors.push(e);
    }

    errors
}
