//! Fixed-interval driving loop around [`Agent::run_once`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::agent::Agent;

/// Runs one cycle per tick until shut down. A failed cycle is logged and
/// the next tick retries from scratch.
pub struct Poller {
    agent: Arc<Agent>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl Clone for Poller {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
            interval: self.interval,
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

impl Poller {
    pub fn new(agent: Arc<Agent>, interval: Duration) -> Self {
        Self {
            agent,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Signal the loop to stop. A cycle already in progress runs to completion.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run the polling loop until shutdown. The first cycle starts immediately.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A cycle that overruns the interval pushes the schedule back
        // instead of firing a burst of catch-up cycles.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            namespace = %self.agent.config().namespace,
            interval_secs = self.interval.as_secs(),
            "poller started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("poller shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match self.agent.run_once().await {
                        Ok(summary) => info!(
                            listed = summary.listed,
                            changed = summary.changed,
                            synced = summary.synced,
                            "cycle complete"
                        ),
                        Err(e) => error!(error = %e, "failed to run the prow agent"),
                    }
                }
            }
        }
    }
}
