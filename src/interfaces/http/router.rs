//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ErrorBody;
use super::middleware::{auth_middleware, AccessPolicy, AuthState, RouteGuard};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::{auth, health, users};
use crate::application::UserService;
use crate::infrastructure::InMemoryUserRepository;

/// Knobs for [`create_api_router`]
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Include bcrypt hashes in `GET /users`
    pub expose_password_hashes: bool,
    /// Mount `GET /metrics` backed by this recorder handle
    pub prometheus: Option<PrometheusHandle>,
}

/// Unified state for the user, auth and health routes.
/// Axum extracts the specific handler state via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub expose_password_hashes: bool,
    pub started_at: Arc<Instant>,
}

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
            expose_password_hashes: s.expose_password_hashes,
        }
    }
}

impl FromRef<ApiState> for auth::AuthHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        auth::AuthHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            user_service: Arc::clone(&s.user_service),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        users::create_user,
        users::list_users,
        users::get_profile,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            ErrorBody,
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            users::UserDto,
            users::UserListItem,
            users::CreateUserRequest,
            users::UpdateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and basic store statistics"),
        (name = "Authentication", description = "Email/password login returning a bearer JWT"),
        (name = "Users", description = "Registration, profile, listing, update and deletion"),
    ),
    info(
        title = "Users Service API",
        version = "1.0.0",
        description = "User registration and JWT authentication over an in-memory store",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    user_service: Arc<UserService<InMemoryUserRepository>>,
    options: RouterOptions,
) -> Router {
    let auth_state = AuthState {
        user_service: Arc::clone(&user_service),
    };

    let api_state = ApiState {
        user_service,
        expose_password_hashes: options.expose_password_hashes,
        started_at: Arc::new(Instant::now()),
    };

    // Public
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/login", post(auth::login))
        .route("/users", post(users::create_user));

    // Admin only
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(
            RouteGuard::new(auth_state.clone(), AccessPolicy::Admin),
            auth_middleware,
        ));

    // Any valid token; per-user rules live in the service
    let member_routes = Router::new()
        .route(
            "/users/profile",
            get(users::get_profile)
                .patch(users::update_profile_segment)
                .delete(users::delete_profile_segment),
        )
        .route(
            "/users/{uuid}",
            patch(users::update_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RouteGuard::new(auth_state, AccessPolicy::Authenticated),
            auth_middleware,
        ));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(member_routes)
        .with_state(api_state)
        .merge(swagger_routes);

    if let Some(handle) = options.prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
