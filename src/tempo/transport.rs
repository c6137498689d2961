//! HTTP transport seam
//!
//! The fetcher only needs "GET this URL within this budget". Production code
//! plugs in a shared `reqwest::Client`; tests plug in a fake.

use crate::error::{Result, TempoError};
use crate::tempo::endpoints::Endpoint;
use async_trait::async_trait;
use std::time::Duration;

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Capability to perform a GET with a timeout
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, endpoint: &Endpoint, timeout: Duration) -> Result<HttpResponse>;
}

/// Transport backed by one shared reqwest client (connection pool)
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing, externally owned client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the crate's user agent
    pub fn with_default_client() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tempo-tarifs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TempoError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client))
    }
}

fn map_reqwest_error(endpoint: &str, err: &reqwest::Error, timeout: Duration) -> TempoError {
    if err.is_timeout() {
        TempoError::timeout(endpoint, format!("no response within {:?}", timeout))
    } else {
        TempoError::transport(endpoint, err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, endpoint: &Endpoint, timeout: Duration) -> Result<HttpResponse> {
        use reqwest::header::ACCEPT;

        let resp = self
            .client
            .get(&endpoint.url)
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&endpoint.name, &e, timeout))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&endpoint.name, &e, timeout))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
