//! Query API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ApiState>`; handlers
//! only ever read.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::store::SnapshotStore;
use crate::types::{ArbitrageOpportunity, ScanStatus};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Read handles on what the scan loop publishes.
pub struct ApiState {
    pub store: Arc<SnapshotStore>,
    pub status: Arc<RwLock<ScanStatus>>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl ApiState {
    pub fn new(store: Arc<SnapshotStore>, status: Arc<RwLock<ScanStatus>>) -> Self {
        Self {
            store,
            status,
            started_at: chrono::Utc::now(),
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub scan: ScanStatus,
    pub opportunities: usize,
    pub uptime_secs: i64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET|POST /
pub async fn get_opportunities(State(state): State<AppState>) -> Json<Vec<ArbitrageOpportunity>> {
    Json(state.store.read_all().await)
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let scan = state.status.read().await.clone();
    let opportunities = state.store.len().await;
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();

    Json(StatusResponse {
        scan,
        opportunities,
        uptime_secs: uptime,
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
