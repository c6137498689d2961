use crate::error::{Result, TempoError};
use crate::logging::{LogContext, StructuredLogger, get_logger, get_logger_with_context};
use crate::snapshot::Snapshot;
use crate::tempo::endpoints::EndpointSet;
use crate::tempo::fetcher::Fetcher;
use tokio::task::JoinSet;

/// Result of one successful (possibly partial) poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub snapshot: Snapshot,
    /// Endpoints that failed this cycle, in catalog order
    pub failed: Vec<String>,
}

impl PollOutcome {
    /// Some but not all endpoints failed
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Fans out one fetch per endpoint and merges the results
#[derive(Debug)]
pub struct Poller {
    endpoints: EndpointSet,
    fetcher: Fetcher,
    logger: StructuredLogger,
}

impl Poller {
    pub fn new(endpoints: EndpointSet, fetcher: Fetcher) -> Self {
        Self {
            endpoints,
            fetcher,
            logger: get_logger("poller"),
        }
    }

    /// Tag log lines with the instance name
    pub fn with_instance(mut self, instance: &str) -> Self {
        self.logger = get_logger_with_context(LogContext::new("poller").with_instance(instance));
        self
    }

    /// Fetch every endpoint concurrently and wait for all of them.
    ///
    /// Fails only when nothing succeeded; a partial result is returned as
    /// `Ok` with the failed names listed.
    pub async fn poll(&self) -> Result<PollOutcome> {
        let mut tasks = JoinSet::new();
        for endpoint in self.endpoints.iter() {
            let fetcher = self.fetcher.clone();
            let endpoint = endpoint.clone();
            tasks.spawn(async move {
                let result = fetcher.fetch(&endpoint).await;
                (endpoint.name, result)
            });
        }

        let mut snapshot = Snapshot::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(value))) => snapshot.insert(name, value),
                Ok((name, Err(e))) => {
                    self.logger
                        .debug(&format!("Fetch of endpoint '{}' failed: {}", name, e));
                }
                // The endpoint shows up in the failed list below
                Err(e) => self.logger.error(&format!("Fetch task aborted: {}", e)),
            }
        }

        let failed: Vec<String> = self
            .endpoints
            .names()
            .filter(|name| !snapshot.contains(name))
            .map(str::to_string)
            .collect();

        if snapshot.is_empty() {
            return Err(TempoError::all_endpoints_failed(failed));
        }

        self.logger.trace(&format!(
            "Poll cycle fetched {}/{} endpoints",
            snapshot.len(),
            self.endpoints.len()
        ));
        Ok(PollOutcome { snapshot, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::endpoints::Endpoint;
    use crate::tempo::transport::{HttpResponse, HttpTransport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    /// Succeeds for the listed endpoint names, 500 for the rest
    struct Subset(HashSet<String>);

    #[async_trait]
    impl HttpTransport for Subset {
        async fn get(&self, endpoint: &Endpoint, _timeout: Duration) -> Result<HttpResponse> {
            if self.0.contains(&endpoint.name) {
                let body = json!({ "endpoint": endpoint.name }).to_string();
                Ok(HttpResponse::new(200, body))
            } else {
                Ok(HttpResponse::new(500, "oops"))
            }
        }
    }

    fn poller_for(ok: &[&str]) -> Poller {
        let transport = Subset(ok.iter().map(|s| s.to_string()).collect());
        Poller::new(
            EndpointSet::tempo("http://fake"),
            Fetcher::new(Arc::new(transport), Duration::from_secs(10)),
        )
    }

    #[tokio::test]
    async fn every_subset_splits_into_snapshot_and_failed() {
        let all: Vec<&str> = crate::tempo::ENDPOINT_CATALOG
            .iter()
            .map(|(name, _)| *name)
            .collect();

        for mask in 1u32..(1 << all.len()) {
            let ok: Vec<&str> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| *n)
                .collect();
            let outcome = poller_for(&ok).poll().await.unwrap();

            let mut got: Vec<&str> = outcome.snapshot.keys().collect();
            got.sort_unstable();
            let mut want = ok.clone();
            want.sort_unstable();
            assert_eq!(got, want, "mask {:#b}", mask);

            let expected_failed: Vec<String> = all
                .iter()
                .filter(|n| !ok.contains(n))
                .map(|n| n.to_string())
                .collect();
            assert_eq!(outcome.failed, expected_failed, "mask {:#b}", mask);
            assert_eq!(outcome.is_partial(), ok.len() < all.len());
        }
    }

    #[tokio::test]
    async fn nothing_succeeding_is_all_endpoints_failed() {
        let err = poller_for(&[]).poll().await.unwrap_err();
        match err {
            TempoError::AllEndpointsFailed { failed } => assert_eq!(failed.len(), 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn snapshot_values_come_from_their_endpoint() {
        let outcome = poller_for(&["now", "stats"]).poll().await.unwrap();
        assert_eq!(outcome.snapshot.get("now"), Some(&json!({"endpoint": "now"})));
        assert_eq!(outcome.snapshot.get("stats"), Some(&json!({"endpoint": "stats"})));
    }
}
