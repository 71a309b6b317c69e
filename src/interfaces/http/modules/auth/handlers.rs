//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::{LoginRequest, LoginResponse};
use crate::application::UserService;
use crate::infrastructure::InMemoryUserRepository;
use crate::interfaces::http::common::{ApiError, ErrorBody, JsonBody};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Wrong email/password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state
        .user_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}
