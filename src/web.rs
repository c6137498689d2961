//! Axum-based HTTP read API over the latest snapshot

use crate::error::{Result, TempoError};
use crate::integration::TempoIntegration;
use crate::snapshot::{PollFailure, PollState, Snapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub integration: Arc<TempoIntegration>,
    /// Where `PUT /api/config` persists changes, if a file was loaded
    pub config_path: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct ConfigUpdate {
    pub update_interval_minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub name: String,
    pub ready: bool,
    pub version: u64,
    pub update_interval_minutes: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<PollFailure>,
    pub endpoints: Vec<String>,
    pub failed_endpoints: Vec<String>,
    pub polls_attempted: u64,
}

impl StatusBody {
    fn new(name: &str, update_interval_minutes: u64, state: &PollState) -> Self {
        Self {
            name: name.to_string(),
            ready: state.is_ready(),
            version: state.version,
            update_interval_minutes,
            last_success: state.last_success,
            last_failure: state.last_failure.clone(),
            endpoints: state.snapshot.keys().map(str::to_string).collect(),
            failed_endpoints: state.failed_endpoints.clone(),
            polls_attempted: state.polls_attempted,
        }
    }
}

fn status_body(integration: &TempoIntegration, state: &PollState) -> StatusBody {
    let minutes = integration.scheduler().update_interval().as_secs() / 60;
    StatusBody::new(integration.name(), minutes, state)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({"error": message.into()})))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.integration.store().current();
    Json(status_body(&state.integration, &current))
}

async fn snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.integration.store().snapshot();
    Json(Snapshot::clone(&snap))
}

async fn measurements(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.integration.measurements())
}

async fn measurement(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match state.integration.measurement(&key) {
        Some(m) => Json(m).into_response(),
        None => error_body(StatusCode::NOT_FOUND, format!("Unknown measurement '{}'", key))
            .into_response(),
    }
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let cfg = state.integration.config().await;
    Json(serde_json::to_value(cfg).unwrap_or(serde_json::json!({"error":"serialization"})))
}

async fn put_config(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let update: ConfigUpdate = match serde_json::from_value(body) {
        Ok(u) => u,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, format!("bad request: {}", e)),
    };
    if let Err(e) = state
        .integration
        .reconfigure(update.update_interval_minutes)
        .await
    {
        return error_body(StatusCode::BAD_REQUEST, e.to_string());
    }
    if let Some(path) = &state.config_path {
        let cfg = state.integration.config().await;
        if let Err(e) = cfg.save_to_file(path) {
            return error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("applied but not saved: {}", e),
            );
        }
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "ok": true,
            "update_interval_minutes": update.update_interval_minutes,
        })),
    )
}

async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

async fn refresh(State(state): State<AppState>) -> axum::response::Response {
    match state.integration.store().refresh().await {
        Ok(current) => Json(status_body(&state.integration, &current)).into_response(),
        Err(e) => error_body(StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
}

async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.integration.store().subscribe();
    let integration = state.integration.clone();
    let stream = WatchStream::new(rx).map(move |current| {
        let body = status_body(&integration, &current);
        let data = serde_json::to_string(&body).unwrap_or_else(|_| "{}".to_string());
        Ok::<Event, std::convert::Infallible>(Event::default().event("state").data(data))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/snapshot", get(snapshot))
        .route("/api/measurements", get(measurements))
        .route("/api/measurements/{key}", get(measurement))
        .route("/api/config", get(get_config).put(put_config))
        .route("/api/config/schema", get(get_config_schema))
        .route("/api/refresh", post(refresh))
        .route("/api/events", get(events))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(
    integration: Arc<TempoIntegration>,
    config_path: Option<PathBuf>,
    host: &str,
    port: u16,
) -> Result<()> {
    let router = build_router(AppState {
        integration,
        config_path,
    });

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TempoError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| TempoError::web(e.to_string()))?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .await
        .map_err(|e| TempoError::web(e.to_string()))
}
