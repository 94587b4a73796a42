//! Query API — Axum server exposing the latest opportunities.
//!
//! Read-only view over the snapshot store. CORS enabled so a browser page
//! can poll it directly.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::engine::shutdown::Shutdown;
use routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/",
            get(routes::get_opportunities).post(routes::get_opportunities),
        )
        .route("/api/status", get(routes::get_status))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` is raised.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: Shutdown,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, "Query API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Query API server error")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::shutdown;
    use crate::engine::store::SnapshotStore;
    use crate::types::{ArbitrageOpportunity, ScanStatus, SchedulerState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use routes::ApiState;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn opp(set: &str, value: i64) -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            set: set.to_string(),
            arbitrage_value: value,
            set_price: 200,
            total_part_price: (200 - value) as u64,
            market_url: format!("https://warframe.market/items/{set}"),
            last_updated: Utc::now(),
        }
    }

    async fn test_state() -> AppState {
        let store = Arc::new(SnapshotStore::new());
        store.replace(opp("a_set", 12)).await;
        store.replace(opp("b_set", 30)).await;
        let status = Arc::new(RwLock::new(ScanStatus {
            state: SchedulerState::Waiting,
            cycles_completed: 3,
            ..ScanStatus::default()
        }));
        Arc::new(ApiState::new(store, status))
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_opportunities_sorted() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["set"], "b_set");
        assert_eq!(list[0]["arbitrage_value"], 30);
        assert_eq!(list[0]["total_part_price"], 170);
        assert!(list[0]["last_updated"].is_string());
        assert_eq!(list[1]["set"], "a_set");
    }

    #[tokio::test]
    async fn test_post_opportunities() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_list() {
        let state = Arc::new(ApiState::new(
            Arc::new(SnapshotStore::new()),
            Arc::new(RwLock::new(ScanStatus::default())),
        ));
        let resp = build_router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["state"], "waiting");
        assert_eq!(json["cycles_completed"], 3);
        assert_eq!(json["opportunities"], 2);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (trigger, shutdown) = shutdown::channel();
        let handle = tokio::spawn(serve(listener, test_state().await, shutdown));

        trigger.trigger();
        let res = tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(res.is_ok());
    }
}
