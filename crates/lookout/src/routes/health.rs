//! Health check endpoints.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// Aggregate health of the monitored system, rendered by the registry
pub async fn health_check(State(state): State<AppState>) -> Response {
    let rendered = state.health.render();
    let code = StatusCode::from_u16(rendered.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = (code, rendered.body).into_response();
    if let Some(content_type) = rendered.content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    endpoints: usize,
    version: &'static str,
}

/// Readiness check (has the endpoint catalog been built?)
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    let catalog = state.catalog.read().await;

    if catalog.refreshed_at > 0 {
        Ok(Json(ReadyResponse {
            status: "ready",
            endpoints: catalog.len(),
            version: env!("CARGO_PKG_VERSION"),
        }))
    } else {
        // Return 503 until the first discovery pass completed
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
