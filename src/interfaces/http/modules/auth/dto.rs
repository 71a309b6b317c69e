//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login request. Missing fields behave like wrong credentials.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 JWT; send back as `Authorization: Bearer <token>`
    pub token: String,
}
