//! ==============================================================================
//! server.rs - web server
//! ==============================================================================
//!
//! routes:
//!     GET /                 server-rendered dashboard (auto refresh)
//!     GET /api/sensor-data  raw snapshot { v0..v15 } in the api envelope
//!     GET /api/dashboard    derived DashboardStats in the api envelope
//!     GET /health           liveness
//!
//! every request triggers a fresh poll of the relay; nothing is cached.
//!
//! ==============================================================================

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Local, SecondsFormat, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::HostConfig;
use crate::dashboard::{render_page, DashboardStats, PageState};
use crate::domain::SensorSnapshot;
use crate::error::RelayError;
use crate::relay::RelayClient;

/// shown to clients when anything other than configuration goes wrong
pub const UPSTREAM_FAILURE: &str = "Failed to fetch sensor data from Blynk server";

#[derive(Clone)]
pub struct AppState {
    relay: RelayClient,
    config: Arc<HostConfig>,
}

impl AppState {
    pub fn new(relay: RelayClient, config: HostConfig) -> Self {
        Self { relay, config: Arc::new(config) }
    }

    async fn poll(&self) -> Result<SensorSnapshot, RelayError> {
        let relay = &self.config.relay;
        let snapshot = self
            .relay
            .fetch_all_channels(&relay.base_url, &relay.auth_token)
            .await?;

        if self.config.logging.show_sensor_data {
            info!(
                "[SENSORS] Temp: {:.1}°C | Humidity: {:.1}% | Pressure: {:.1} | Soil: {}/{}/{}%",
                snapshot.temperature,
                snapshot.humidity,
                snapshot.pressure,
                snapshot.soil1_percentage,
                snapshot.soil2_percentage,
                snapshot.soil3_percentage,
            );
        }
        Ok(snapshot)
    }
}

// ==============================================================================
// response envelope
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: timestamp(),
        }
    }
}

impl ApiResponse<()> {
    fn failed(err: &RelayError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(client_message(err)),
            timestamp: timestamp(),
        }
    }
}

/// ISO-8601, UTC, millisecond precision
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// keep configuration failures distinguishable from upstream ones
fn client_message(err: &RelayError) -> String {
    match err {
        RelayError::Configuration(msg) => format!("Server configuration error: {}", msg),
        RelayError::Incomplete { .. } | RelayError::Client(_) => UPSTREAM_FAILURE.to_string(),
    }
}

fn failure_response(err: RelayError) -> Response {
    error!("Error in sensor data API: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::failed(&err))).into_response()
}

// ==============================================================================
// router
// ==============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/sensor-data", get(sensor_data_handler))
        .route("/api/dashboard", get(dashboard_api_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn sensor_data_handler(State(state): State<AppState>) -> Response {
    match state.poll().await {
        Ok(snapshot) => Json(ApiResponse::ok(snapshot)).into_response(),
        Err(e) => failure_response(e),
    }
}

async fn dashboard_api_handler(State(state): State<AppState>) -> Response {
    match state.poll().await {
        Ok(snapshot) => {
            let stats = DashboardStats::from_snapshot(&snapshot, Local::now().naive_local());
            Json(ApiResponse::ok(stats)).into_response()
        }
        Err(e) => failure_response(e),
    }
}

async fn dashboard_handler(State(state): State<AppState>) -> Html<String> {
    let refresh = state.config.polling.interval_seconds;
    match state.poll().await {
        Ok(snapshot) => {
            let stats = DashboardStats::from_snapshot(&snapshot, Local::now().naive_local());
            Html(render_page(PageState::Online(&stats), refresh))
        }
        Err(e) => {
            error!("Error rendering dashboard: {}", e);
            let message = client_message(&e);
            Html(render_page(PageState::Offline { error: &message }, refresh))
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
