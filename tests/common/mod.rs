#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempo_tarifs::config::REQUEST_TIMEOUT;
use tempo_tarifs::error::{Result, TempoError};
use tempo_tarifs::store::SnapshotStore;
use tempo_tarifs::tempo::{Endpoint, EndpointSet, Fetcher, HttpResponse, HttpTransport, Poller};

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Hang,
    Fail,
}

/// In-memory stand-in for the Tempo API
pub struct FakeTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl FakeTransport {
    /// Every endpoint answers with its sample payload
    pub fn healthy() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set(&self, name: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(name.to_string(), reply);
    }

    pub fn set_all(&self, reply: Reply) {
        for (name, _) in tempo_tarifs::tempo::ENDPOINT_CATALOG {
            self.set(name, reply.clone());
        }
    }

    pub fn reset(&self) {
        self.replies.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, endpoint: &Endpoint, _timeout: Duration) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&endpoint.name)
            .cloned()
            .unwrap_or_else(|| Reply::Json(sample_body(&endpoint.name)));
        match reply {
            Reply::Json(body) => Ok(HttpResponse::new(200, body.to_string())),
            Reply::Status(code) => Ok(HttpResponse::new(code, "{}")),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(HttpResponse::new(200, "{}"))
            }
            Reply::Fail => Err(TempoError::transport(&endpoint.name, "connection refused")),
        }
    }
}

pub fn sample_body(name: &str) -> Value {
    match name {
        "tarifs" => json!({
            "bleuHC": 0.1296,
            "bleuHP": 0.1609,
            "blancHC": 0.1486,
            "blancHP": 0.1894,
            "rougeHC": 0.1568,
            "rougeHP": 0.7562,
            "dateDebut": "2022-09-01",
            "dateFin": null,
            "dateMaj": "2025-02-01",
            "tarifForce": false,
            "dataGouvId": 3
        }),
        "now" => json!({
            "libTarif": "HP Bleu",
            "tarifKwh": 0.1609,
            "codeCouleur": 1,
            "codeHoraire": 1,
            "applicableIn": "2025-10-19T06:00:00+02:00"
        }),
        "24h" => json!([
            {"dateHeure": "2025-10-19T06:00", "codeCouleur": 1, "codeHoraire": 1},
            {"dateHeure": "2025-10-19T22:00", "codeCouleur": 1, "codeHoraire": 2}
        ]),
        "today" | "tomorrow" | "yesterday" => json!({
            "dateJour": "2025-10-19",
            "codeJour": 1,
            "periode": "2025-2026",
            "libCouleur": "Bleu"
        }),
        _ => json!({
            "periode": "2025-2026",
            "bissextile": false,
            "dernierJourInclus": "2025-10-19",
            "joursBleusConsommes": 49,
            "joursBlancsConsommes": 0,
            "joursRougesConsommes": 0,
            "joursBleusRestants": 251,
            "joursBlancsRestants": 43,
            "joursRougesRestants": 22
        }),
    }
}

pub fn poller(transport: Arc<FakeTransport>) -> Poller {
    Poller::new(
        EndpointSet::tempo("http://tempo.test/api"),
        Fetcher::new(transport, REQUEST_TIMEOUT),
    )
}

pub fn store(transport: Arc<FakeTransport>) -> SnapshotStore {
    SnapshotStore::new(poller(transport), "test")
}
