//! Axum routes and connection entry points.
//!
//! Producers and observers get separate routes (`/agent`, `/ui`) with fully
//! isolated message vocabularies: a work submission can never be routed to an
//! observer and vice versa, and each class's wire format can evolve
//! independently.

pub mod agent;
pub mod observer;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the coordinator's router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/agent", get(agent::upgrade))
        .route("/ui", get(observer::upgrade))
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router until the state's shutdown token fires.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

/// Liveness endpoint with the current online count.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "online": state.registry.count(),
        "observers": state.broadcaster.observer_count(),
    }))
}

/// Render Prometheus text from the installed recorder.
async fn render_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics_handle {
        Some(ref handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{state_with_stub, StubProcessor};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_online_count() {
        let state = state_with_stub(StubProcessor::default());
        let app = router(state);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["online"], 0);
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_not_found() {
        let state = state_with_stub(StubProcessor::default());
        let app = router(state);

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let state = state_with_stub(StubProcessor::default());
        let app = router(state);

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
