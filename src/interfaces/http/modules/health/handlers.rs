//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::UserService;
use crate::infrastructure::InMemoryUserRepository;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub users: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "User store unavailable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, users) = match state.user_service.count_users().await {
        Ok(count) => ("healthy", StatusCode::OK, count),
        Err(e) => {
            tracing::warn!("Health check could not read the user store: {}", e);
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, 0)
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            users,
        }),
    )
}
