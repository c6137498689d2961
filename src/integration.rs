//! Integration lifecycle
//!
//! `setup` polls once and refuses to come up if nothing answers; after that
//! the scheduler keeps the snapshot fresh until `unload`.

use crate::config::{Config, REQUEST_TIMEOUT};
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::measurements::{Measurement, descriptor, render_all};
use crate::scheduler::SchedulerHandle;
use crate::store::SnapshotStore;
use crate::tempo::{EndpointSet, Fetcher, HttpTransport, Poller};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct TempoIntegration {
    name: String,
    config: RwLock<Config>,
    store: SnapshotStore,
    scheduler: SchedulerHandle,
    logger: StructuredLogger,
}

impl TempoIntegration {
    /// Validate the configuration, poll once, then start the scheduler.
    ///
    /// Returns `TempoError::NotReady` when every endpoint failed on the first
    /// poll; the caller is expected to retry later.
    pub async fn setup(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let period = config.update_interval()?;
        let name = config.name.clone();
        let logger = get_logger_with_context(LogContext::new("integration").with_instance(&name));

        let endpoints = EndpointSet::tempo(&config.api.base_url);
        let fetcher = Fetcher::new(transport, REQUEST_TIMEOUT);
        let poller = Poller::new(endpoints, fetcher).with_instance(&name);
        let store = SnapshotStore::new(poller, &name);

        let state = store.refresh_now().await?;
        logger.info(&format!(
            "Initial poll fetched {} endpoints",
            state.snapshot.len()
        ));

        let scheduler = SchedulerHandle::spawn(store.clone(), period, &name);

        Ok(Self {
            name,
            config: RwLock::new(config),
            store,
            scheduler,
            logger,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the active configuration
    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// All measurements rendered from the current snapshot
    pub fn measurements(&self) -> Vec<Measurement> {
        render_all(&self.store.snapshot())
    }

    pub fn measurement(&self, key: &str) -> Option<Measurement> {
        descriptor(key).map(|d| Measurement::render(&self.store.snapshot(), d))
    }

    /// Change the poll period at runtime; the snapshot is left as is
    pub async fn reconfigure(&self, update_interval_minutes: u64) -> Result<Duration> {
        let period = self.scheduler.set_update_interval(update_interval_minutes)?;
        self.config.write().await.update_interval_minutes = update_interval_minutes;
        self.logger.info(&format!(
            "Update interval set to {} minutes",
            update_interval_minutes
        ));
        Ok(period)
    }

    /// Stop polling; waits for a poll in progress
    pub async fn unload(&self) {
        self.scheduler.shutdown().await;
        self.logger.info("Integration unloaded");
    }
}
