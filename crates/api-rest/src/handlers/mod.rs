//! REST request handlers, grouped by surface.

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod delivery;
pub mod files;
pub mod lists;

use axum::extract::State;
use axum::response::Json;

use crate::AppState;
use api_shared::{dto, HealthService};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint.
///
/// Used for monitoring and load balancer health checks; requires no session.
pub async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}
