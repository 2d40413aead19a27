//! HTTP API for the door controller.
//!
//! # Endpoints
//!
//! - `OPTIONS /` - Connection test used by the control page
//! - `POST /{nonce}/{door}/{signature}` - Trigger a door (see [`crate::services::auth`])
//! - `GET /health` - Health check
//! - `GET /api/doors` - Status of every door
//! - `GET /api/doors/{door}` - Status of one door (by index or name)
//! - anything else - Embedded control page
//!
//! The trigger route answers in plain text because the control page reads
//! the expected nonce straight from the body of a `400` response.

pub mod static_files;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::gpio::{self, PinBackend};
use crate::models::DoorStatus;
use crate::services::{AuthOutcome, Authenticator, DoorMonitor, DoorService};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    doors: Arc<DoorService>,
    auth: Arc<Authenticator>,
    monitor: Arc<DoorMonitor>,
}

impl AppState {
    /// Creates the state with the nonce seeded from the clock.
    pub fn new(config: &Config, pins: Arc<dyn PinBackend>) -> anyhow::Result<Self> {
        let auth = Authenticator::from_clock(&config.auth.password)?;
        Self::with_authenticator(config, pins, auth)
    }

    /// Creates the state around an existing authenticator.
    pub fn with_authenticator(
        config: &Config,
        pins: Arc<dyn PinBackend>,
        auth: Authenticator,
    ) -> anyhow::Result<Self> {
        let doors = Arc::new(DoorService::new(config, pins)?);
        let monitor = Arc::new(DoorMonitor::new(Arc::clone(&doors)));
        monitor.poll();

        Ok(Self {
            doors,
            auth: Arc::new(auth),
            monitor,
        })
    }

    /// Returns the authenticator.
    #[must_use]
    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    /// Returns the door monitor.
    #[must_use]
    pub fn monitor(&self) -> &Arc<DoorMonitor> {
        &self.monitor
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
    /// Number of configured doors.
    pub doors: usize,
}

/// Door list response.
#[derive(Debug, Serialize)]
pub struct DoorListResponse {
    /// Status of every door, in table order.
    pub doors: Vec<DoorStatus>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// OPTIONS / - Connection test.
async fn probe() -> StatusCode {
    StatusCode::OK
}

/// GET /health - Health check.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        doors: state.doors.door_count(),
    })
}

/// POST /{nonce}/{door}/{signature} - Trigger a door.
///
/// - `200` the door was pulsed
/// - `400` the nonce is not the expected one; the body is the expected nonce
/// - `401` the signature does not match
/// - `404` no such door (the nonce is not consumed)
/// - `500` the action pin could not be driven (the nonce is consumed)
async fn trigger_door(
    State(state): State<AppState>,
    Path((nonce, door, signature)): Path<(String, String, String)>,
) -> Response {
    let Some(index) = state.doors.resolve(&door) else {
        return (StatusCode::NOT_FOUND, format!("Unknown door: {door}")).into_response();
    };

    let Ok(nonce) = nonce.parse::<u64>() else {
        return stale_nonce(state.auth.expected_nonce());
    };

    match state.auth.check(nonce, &signature) {
        AuthOutcome::StaleNonce(expected) => stale_nonce(expected),
        AuthOutcome::BadSignature => {
            warn!("Rejected request for door {} with a bad signature", index);
            (StatusCode::UNAUTHORIZED, "Bad password").into_response()
        }
        AuthOutcome::Accepted => match state.doors.trigger(index).await {
            Ok(()) => (StatusCode::OK, "OK").into_response(),
            Err(e) => {
                error!("Failed to trigger door {}: {:#}", index, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to trigger door").into_response()
            }
        },
    }
}

fn stale_nonce(expected: u64) -> Response {
    (StatusCode::BAD_REQUEST, expected.to_string()).into_response()
}

/// GET /api/doors - Status of every door.
async fn list_doors(State(state): State<AppState>) -> Json<DoorListResponse> {
    Json(DoorListResponse {
        doors: state.monitor.statuses(),
    })
}

/// GET /api/doors/{door} - Status of one door.
async fn get_door(
    State(state): State<AppState>,
    Path(door): Path<String>,
) -> Result<Json<DoorStatus>, (StatusCode, Json<ApiError>)> {
    state
        .doors
        .resolve(&door)
        .and_then(|index| state.monitor.status(index))
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(format!("Unknown door: {door}"))),
            )
        })
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The control page may be served from another origin (e.g. installed
    // as a home-screen app), so any origin is allowed. Requests are
    // authenticated by signature, not by origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(static_files::serve_static).options(probe))
        .route("/health", get(health_check))
        .route("/api/doors", get(list_doors))
        .route("/api/doors/{door}", get(get_door))
        .route("/{nonce}/{door}/{signature}", post(trigger_door))
        .fallback(static_files::serve_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Validated controller configuration
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the pins cannot be claimed or the server fails to start.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let pins = gpio::open(&config.gpio)?;
    let state = AppState::new(&config, pins)?;

    let poller = Arc::clone(state.monitor()).spawn(config.poll_interval());
    let app = create_router(state);

    info!(
        "Starting garage door controller on {} ({} doors)",
        addr,
        config.door_count()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
