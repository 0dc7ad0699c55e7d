//! Endpoint catalog listing.

use axum::{extract::State, Json};

use lookout_common::EndpointCatalog;
use crate::state::AppState;

/// Endpoints currently handed to the check scheduler
pub async fn list_endpoints(State(state): State<AppState>) -> Json<EndpointCatalog> {
    Json(state.catalog().await)
}
