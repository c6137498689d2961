//! Snapshot store
//!
//! Owns the committed [`PollState`] behind a watch channel. Only the poll
//! routine writes it; readers clone the current `Arc` and never wait on a
//! poll in progress.

use crate::error::{Result, TempoError};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::snapshot::{PollFailure, PollState, Snapshot};
use crate::tempo::Poller;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

struct StoreInner {
    poller: Poller,
    state: watch::Sender<Arc<PollState>>,
    /// Held for the duration of one poll
    gate: Mutex<()>,
    logger: StructuredLogger,
}

/// Shared handle to the poll state; cheap to clone
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.current();
        f.debug_struct("SnapshotStore")
            .field("version", &state.version)
            .field("endpoints", &state.snapshot.len())
            .finish_non_exhaustive()
    }
}

impl SnapshotStore {
    pub fn new(poller: Poller, instance: &str) -> Self {
        let (state, _) = watch::channel(Arc::new(PollState::default()));
        Self {
            inner: Arc::new(StoreInner {
                poller,
                state,
                gate: Mutex::new(()),
                logger: get_logger_with_context(LogContext::new("store").with_instance(instance)),
            }),
        }
    }

    /// Latest committed state
    pub fn current(&self) -> Arc<PollState> {
        self.inner.state.borrow().clone()
    }

    /// Latest committed snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// Receiver notified after every poll, successful or not
    pub fn subscribe(&self) -> watch::Receiver<Arc<PollState>> {
        self.inner.state.subscribe()
    }

    /// Run one poll and commit its result.
    ///
    /// If a poll is already running, waits for it and reports its outcome
    /// instead of polling again.
    pub async fn refresh(&self) -> Result<Arc<PollState>> {
        let seen = self.current();
        let _guard = match self.inner.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let _in_flight = self.inner.gate.lock().await;
                self.inner.logger.trace("Refresh coalesced with in-flight poll");
                return self.outcome_since(&seen);
            }
        };

        let result = self.inner.poller.poll().await;
        let previous = self.current();

        match result {
            Ok(outcome) => {
                if outcome.is_partial() {
                    self.inner.logger.warn(&format!(
                        "Tempo API partial update failed for: {}",
                        outcome.failed.join(", ")
                    ));
                }
                let next = Arc::new(PollState {
                    snapshot: Arc::new(outcome.snapshot),
                    version: previous.version + 1,
                    last_success: Some(Utc::now()),
                    last_failure: previous.last_failure.clone(),
                    failed_endpoints: outcome.failed,
                    polls_attempted: previous.polls_attempted + 1,
                });
                self.inner.state.send_replace(next.clone());
                self.inner.logger.debug(&format!(
                    "Committed snapshot version {} with {} endpoints",
                    next.version,
                    next.snapshot.len()
                ));
                Ok(next)
            }
            Err(e) => {
                self.inner.logger.warn(&format!(
                    "Error fetching EDF Tempo data: {}; keeping previous snapshot",
                    e
                ));
                let next = Arc::new(PollState {
                    snapshot: previous.snapshot.clone(),
                    version: previous.version,
                    last_success: previous.last_success,
                    last_failure: Some(PollFailure {
                        at: Utc::now(),
                        reason: e.to_string(),
                        endpoints: match &e {
                            TempoError::AllEndpointsFailed { failed } => failed.clone(),
                            _ => Vec::new(),
                        },
                    }),
                    failed_endpoints: previous.failed_endpoints.clone(),
                    polls_attempted: previous.polls_attempted + 1,
                });
                self.inner.state.send_replace(next);
                Err(e)
            }
        }
    }

    /// Result of the poll that ran after `seen` was observed
    fn outcome_since(&self, seen: &PollState) -> Result<Arc<PollState>> {
        let current = self.current();
        match &current.last_failure {
            Some(failure)
                if current.version == seen.version
                    && current.polls_attempted > seen.polls_attempted =>
            {
                Err(TempoError::all_endpoints_failed(failure.endpoints.clone()))
            }
            _ => Ok(current),
        }
    }

    /// Initial refresh used during setup; total failure means not ready
    pub async fn refresh_now(&self) -> Result<Arc<PollState>> {
        self.refresh().await.map_err(|e| match e {
            TempoError::AllEndpointsFailed { .. } => TempoError::not_ready(e.to_string()),
            other => other,
        })
    }

    /// Wait until no poll is running
    pub async fn wait_idle(&self) {
        let _guard = self.inner.gate.lock().await;
    }
}
