//! # Tempo Tarifs - EDF Tempo tariff poller
//!
//! Periodically polls the public EDF Tempo colour API, keeps the merged result
//! of the latest poll cycle in memory and projects it into named measurements
//! (per-period prices, today's and tomorrow's colours, season statistics).
//!
//! ## Architecture
//!
//! - `tempo`: endpoint catalog, HTTP transport seam, fetcher and fan-out poller
//! - `snapshot`: snapshot and poll state types
//! - `store`: committed poll state behind a watch channel
//! - `scheduler`: periodic refresh loop
//! - `measurements`: static descriptor table and projection
//! - `integration`: setup/unload lifecycle tying the above together
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `web`: HTTP read API (feature `web`)

pub mod config;
pub mod error;
pub mod integration;
pub mod logging;
pub mod measurements;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod tempo;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TempoError};
pub use integration::TempoIntegration;
pub use snapshot::{PollState, Snapshot};
pub use store::SnapshotStore;
