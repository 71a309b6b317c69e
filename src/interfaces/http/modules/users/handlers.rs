//! User API handlers
//!
//! Thin wrappers that delegate to `UserService` from the
//! application/identity layer.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::dto::{
    CreateUserRequest, UpdateUserRequest, UserDto, UserListItem, REQUIRED_REGISTRATION_KEYS,
};
use crate::application::UserService;
use crate::domain::user::messages;
use crate::domain::{DomainError, User};
use crate::infrastructure::InMemoryUserRepository;
use crate::interfaces::http::common::{ApiError, ErrorBody, JsonBody};
use crate::interfaces::http::middleware::CurrentUser;

/// User handler state (concrete over `InMemoryUserRepository` for Axum compatibility)
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub expose_password_hashes: bool,
}

/// Check that every registration key is present, then deserialize.
fn parse_registration(body: Value) -> Result<CreateUserRequest, DomainError> {
    let has_all_keys = body
        .as_object()
        .is_some_and(|obj| REQUIRED_REGISTRATION_KEYS.iter().all(|k| obj.contains_key(*k)));
    if !has_all_keys {
        return Err(DomainError::Validation(
            messages::MISSING_REGISTRATION_KEYS.into(),
        ));
    }

    serde_json::from_value(body)
        .map_err(|e| DomainError::Validation(format!("Invalid user payload: {}", e)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Missing keys", body = ErrorBody),
        (status = 409, description = "E-mail already registered", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    // A taken email wins over a malformed body.
    if let Some(email) = body.get("email").and_then(Value::as_str) {
        state.user_service.ensure_email_available(email).await?;
    }

    let request = parse_registration(body)?;
    let user = state.user_service.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserListItem>),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid token or not an admin", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
) -> Result<Json<Vec<UserListItem>>, ApiError> {
    let users = state.user_service.list_users().await?;
    let items = users
        .into_iter()
        .map(|u| UserListItem::from_user(u, state.expose_password_hashes))
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's own record", body = UserDto),
        (status = 401, description = "Missing token", body = ErrorBody),
        (status = 403, description = "Invalid token", body = ErrorBody)
    )
)]
pub async fn get_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserDto> {
    Json(UserDto::from(user))
}

#[utoipa::path(
    patch,
    path = "/users/{uuid}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("uuid" = String, Path, description = "User uuid")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 403, description = "Not yourself and not an admin", body = ErrorBody),
        (status = 404, description = "No user with this uuid", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(uuid): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    update_target(&state, &actor, &uuid, request).await
}

async fn update_target(
    state: &UserHandlerState,
    actor: &User,
    target_id: &str,
    request: UpdateUserRequest,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .user_service
        .update_user(actor, target_id, request.into())
        .await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{uuid}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("uuid" = String, Path, description = "User uuid")),
    responses(
        (status = 204, description = "User deleted (or did not exist)"),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_user(actor.is_admin, &uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Path segment of `GET /users/profile`.
///
/// The static route shadows `/users/{uuid}`, so PATCH and DELETE on it
/// treat the segment itself as the target uuid.
pub const PROFILE_SEGMENT: &str = "profile";

/// `PATCH /users/profile`
pub async fn update_profile_segment(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    update_target(&state, &actor, PROFILE_SEGMENT, request).await
}

/// `DELETE /users/profile`
pub async fn delete_profile_segment(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .delete_user(actor.is_admin, PROFILE_SEGMENT)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_reports_any_missing_key() {
        for key in REQUIRED_REGISTRATION_KEYS {
            let mut body = json!({
                "name": "A", "email": "a@x.com", "password": "p", "isAdm": false
            });
            body.as_object_mut().unwrap().remove(key);

            let err = parse_registration(body).unwrap_err();
            assert!(
                matches!(err, DomainError::Validation(ref m) if m == messages::MISSING_REGISTRATION_KEYS),
                "missing {key}"
            );
        }
    }

    #[test]
    fn registration_rejects_non_object_body() {
        assert!(parse_registration(json!(["name"])).is_err());
    }

    #[test]
    fn registration_rejects_wrong_types() {
        let err = parse_registration(json!({
            "name": "A", "email": "a@x.com", "password": "p", "isAdm": "yes"
        }))
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.starts_with("Invalid user payload")));
    }
}
