//! Snapshot and poll state types
//!
//! A [`Snapshot`] maps endpoint names to the JSON they returned in one poll
//! cycle. It holds only that cycle's successes: an endpoint that failed is
//! absent rather than carried over from an earlier cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Merged result of one poll cycle, keyed by endpoint name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Endpoint names present, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Why the most recent failed poll failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollFailure {
    pub at: DateTime<Utc>,
    pub reason: String,
    /// Endpoints that failed in that poll
    pub endpoints: Vec<String>,
}

/// Everything readers may observe about the poller, replaced as one unit
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last committed snapshot
    pub snapshot: Arc<Snapshot>,
    /// Number of commits so far; 0 means nothing has been fetched yet
    pub version: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<PollFailure>,
    /// Endpoints missing from the committed snapshot
    pub failed_endpoints: Vec<String>,
    /// Polls run, successful or not
    pub polls_attempted: u64,
}

impl PollState {
    /// Whether at least one poll has been committed
    pub fn is_ready(&self) -> bool {
        self.version > 0
    }
}
