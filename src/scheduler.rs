//! Periodic refresh driver
//!
//! Runs `SnapshotStore::refresh` once per update interval on a background
//! task. The first tick fires one full period after start, since setup has
//! already polled once.

use crate::config::update_interval_from_minutes;
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::store::SnapshotStore;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Control handle for the background refresh loop
pub struct SchedulerHandle {
    store: SnapshotStore,
    interval_tx: watch::Sender<Duration>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    logger: StructuredLogger,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("update_interval", &self.update_interval())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn arm(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl SchedulerHandle {
    /// Start the loop; `period` must already be validated
    pub fn spawn(store: SnapshotStore, period: Duration, instance: &str) -> Self {
        let logger = get_logger_with_context(LogContext::new("scheduler").with_instance(instance));
        let (interval_tx, interval_rx) = watch::channel(period);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(store.clone(), interval_rx, shutdown_rx, logger.clone()));
        logger.info(&format!("Scheduled refresh every {:?}", period));

        Self {
            store,
            interval_tx,
            shutdown_tx,
            task: Mutex::new(Some(task)),
            logger,
        }
    }

    pub fn update_interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }

    /// Validate and apply a new period; the timer restarts from now
    pub fn set_update_interval(&self, minutes: u64) -> Result<Duration> {
        let period = update_interval_from_minutes(minutes)?;
        self.interval_tx.send_replace(period);
        Ok(period)
    }

    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.interval_tx.is_closed()
    }

    /// Stop the loop and wait for any poll in progress
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        if let Some(task) = self.task.lock().await.take()
            && let Err(e) = task.await
        {
            self.logger.error(&format!("Scheduler task ended abnormally: {}", e));
        }
        self.store.wait_idle().await;
        self.logger.info("Scheduler stopped");
    }
}

async fn run(
    store: SnapshotStore,
    mut interval_rx: watch::Receiver<Duration>,
    mut shutdown_rx: watch::Receiver<bool>,
    logger: StructuredLogger,
) {
    let mut ticker = arm(*interval_rx.borrow_and_update());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // The store already logged the failure and kept its snapshot
                if let Err(e) = store.refresh().await {
                    logger.debug(&format!("Scheduled refresh failed: {}", e));
                }
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *interval_rx.borrow_and_update();
                ticker = arm(period);
                logger.info(&format!("Update interval changed to {:?}", period));
            }
            _ = shutdown_rx.changed() => {
                logger.debug("Shutdown signal received");
                break;
            }
        }
    }
}
