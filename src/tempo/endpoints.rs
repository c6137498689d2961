use crate::error::{Result, TempoError};
use serde::Serialize;
use std::collections::HashSet;

pub const TARIFS: &str = "tarifs";
pub const NOW: &str = "now";
pub const FORECAST_24H: &str = "24h";
pub const TODAY: &str = "today";
pub const TOMORROW: &str = "tomorrow";
pub const YESTERDAY: &str = "yesterday";
pub const STATS: &str = "stats";

/// Logical endpoint name and path suffix below the API base URL
pub const ENDPOINT_CATALOG: [(&str, &str); 7] = [
    (TARIFS, "/tarifs"),
    (NOW, "/now"),
    (FORECAST_24H, "/24h"),
    (TODAY, "/jourTempo/today"),
    (TOMORROW, "/jourTempo/tomorrow"),
    (YESTERDAY, "/jourTempo/yesterday"),
    (STATS, "/stats"),
];

/// One named, independently fetchable JSON resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
}

/// Fixed, ordered set of endpoints polled on every cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
}

impl EndpointSet {
    /// Build a set from `(name, url)` pairs; names must be unique and non-empty
    pub fn new<I, N, U>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut endpoints = Vec::new();
        for (name, url) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(TempoError::validation("endpoints", "Endpoint name cannot be empty"));
            }
            if !seen.insert(name.clone()) {
                return Err(TempoError::Validation {
                    field: "endpoints".to_string(),
                    message: format!("Duplicate endpoint name '{}'", name),
                });
            }
            endpoints.push(Endpoint {
                name,
                url: url.into(),
            });
        }
        if endpoints.is_empty() {
            return Err(TempoError::validation(
                "endpoints",
                "At least one endpoint is required",
            ));
        }
        Ok(Self { endpoints })
    }

    /// The full Tempo catalog rooted at `base_url`
    pub fn tempo(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            endpoints: ENDPOINT_CATALOG
                .iter()
                .map(|(name, path)| Endpoint {
                    name: (*name).to_string(),
                    url: format!("{}{}", base, path),
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// Endpoint names in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
