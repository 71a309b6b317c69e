//! Authentication middleware for Axum
//!
//! Each protected route group declares an [`AccessPolicy`]; the middleware
//! walks the request through
//! `no token → token present → token valid → subject resolved → authorized`
//! and either rejects it or stores the resolved [`CurrentUser`] in the
//! request extensions.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::common::ApiError;
use crate::application::UserService;
use crate::domain::user::messages;
use crate::domain::{DomainError, User};
use crate::infrastructure::crypto::jwt::verify_token;
use crate::infrastructure::InMemoryUserRepository;

/// Capability a route requires beyond a valid token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any user holding a valid token
    Authenticated,
    /// Users with the admin flag only
    Admin,
}

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header at all
    MissingToken,
    /// Header not in `Bearer <token>` form, or signature/expiry/issuer check failed
    InvalidToken,
    /// Token is valid but its subject is no longer in the store
    UnknownSubject,
    InsufficientPermissions,
    /// The user store could not be read while resolving the subject
    StoreUnavailable,
}

impl AuthError {
    /// Metric label for the rejection reason
    pub fn label(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::StoreUnavailable => "store_unavailable",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized(messages::MISSING_AUTHORIZATION),
            AuthError::InvalidToken => ApiError::forbidden(messages::MISSING_AUTHORIZATION),
            AuthError::UnknownSubject => ApiError::forbidden(messages::UNKNOWN_TOKEN_SUBJECT),
            AuthError::InsufficientPermissions => {
                ApiError::forbidden(messages::MISSING_ADMIN_PERMISSIONS)
            }
            AuthError::StoreUnavailable => ApiError::from(DomainError::Internal(
                "user store unavailable during authentication".into(),
            )),
        }
    }
}

/// Authentication state shared by all guarded routes
#[derive(Clone)]
pub struct AuthState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
}

/// Middleware state: who may pass, checked against what.
#[derive(Clone)]
pub struct RouteGuard {
    pub auth: AuthState,
    pub policy: AccessPolicy,
}

impl RouteGuard {
    pub fn new(auth: AuthState, policy: AccessPolicy) -> Self {
        Self { auth, policy }
    }
}

/// The user the bearer token resolved to.
///
/// Extract in handlers: `Extension(CurrentUser(user)): Extension<CurrentUser>`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the acting user from an `Authorization` header value and check it
/// against `policy`.
pub async fn authenticate(
    auth: &AuthState,
    auth_header: Option<&str>,
    policy: AccessPolicy,
) -> Result<User, AuthError> {
    let auth_header = auth_header.ok_or(AuthError::MissingToken)?;
    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    let claims = verify_token(token, auth.user_service.jwt_config()).map_err(|e| {
        debug!("Token rejected: {}", e);
        AuthError::InvalidToken
    })?;

    let user = auth
        .user_service
        .get_user_by_id(&claims.sub)
        .await
        .map_err(|e| {
            error!("Token subject lookup failed: {}", e);
            AuthError::StoreUnavailable
        })?
        .ok_or(AuthError::UnknownSubject)?;

    if policy == AccessPolicy::Admin && !user.is_admin {
        debug!(user_id = %user.id, "Admin route denied");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(user)
}

/// Bearer-token middleware enforcing the guard's [`AccessPolicy`]
pub async fn auth_middleware(
    State(guard): State<RouteGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);

    match authenticate(&guard.auth, auth_header.as_deref(), guard.policy).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(err) => {
            metrics::counter!("users_auth_rejections_total", "reason" => err.label()).increment(1);
            ApiError::from(err).into_response()
        }
    }
}
