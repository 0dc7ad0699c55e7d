//! HTTP route handlers for Lookout.

use axum::{
    Router,
    routing::{get, post},
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use lookout_common::{HealthStatus, LookoutError};
use crate::state::AppState;

mod endpoints;
mod health;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Endpoint catalog
        .route("/endpoints", get(endpoints::list_endpoints))

        // Admin endpoints (status updates from the check scheduler)
        .nest("/admin", admin_routes())

        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}

/// Admin routes (aggregate status, re-discovery)
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status).post(set_status))
        .route("/rediscover", post(rediscover))
}

// === Admin Handlers ===

#[derive(Debug, Serialize, Deserialize)]
struct StatusPayload {
    status: HealthStatus,
}

async fn get_status(State(state): State<AppState>) -> Json<StatusPayload> {
    Json(StatusPayload {
        status: state.health.status(),
    })
}

async fn set_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusPayload>,
) -> Json<StatusPayload> {
    state.set_status(payload.status);
    Json(payload)
}

#[derive(Serialize)]
struct RediscoverResponse {
    endpoints: usize,
    discovered: usize,
}

async fn rediscover(
    State(state): State<AppState>,
) -> Result<Json<RediscoverResponse>, (StatusCode, String)> {
    let catalog = state.refresh_endpoints().await.map_err(|e| {
        tracing::warn!(
            namespace = e.namespace().unwrap_or("-"),
            error = %e,
            "Manual re-discovery failed"
        );
        let err = LookoutError::from(e);
        let code =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, err.to_string())
    })?;

    Ok(Json(RediscoverResponse {
        endpoints: catalog.len(),
        discovered: catalog.discovered,
    }))
}
