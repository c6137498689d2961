use crate::error::{Result, TempoError};
use crate::tempo::endpoints::Endpoint;
use crate::tempo::transport::HttpTransport;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Single bounded GET + JSON parse against one endpoint.
///
/// No retries: a failed fetch is simply left out of the current cycle.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and parse one endpoint.
    ///
    /// The transport gets the same budget, but the outer timer is what bounds
    /// the call regardless of how the transport behaves.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<Value> {
        let response =
            match tokio::time::timeout(self.timeout, self.transport.get(endpoint, self.timeout))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(TempoError::timeout(
                        &endpoint.name,
                        format!("no response within {:?}", self.timeout),
                    ));
                }
            };

        if response.status != 200 {
            return Err(TempoError::http_status(&endpoint.name, response.status));
        }

        let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
            TempoError::transport(&endpoint.name, format!("Malformed JSON body: {}", e))
        })?;

        match body {
            Value::Object(_) | Value::Array(_) => Ok(body),
            other => Err(TempoError::transport(
                &endpoint.name,
                format!("Expected a JSON object or array, got {}", other),
            )),
        }
    }
}
