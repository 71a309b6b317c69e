//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CreateUserDto, UpdateUserDto, User};

/// Keys a registration body must contain, in the order they are reported.
pub const REQUIRED_REGISTRATION_KEYS: [&str; 4] = ["name", "email", "password", "isAdm"];

/// User API representation (no password hash)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub is_adm: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            uuid: u.id,
            name: u.name,
            email: u.email,
            is_adm: u.is_admin,
            created_on: u.created_at,
            updated_on: u.updated_at,
        }
    }
}

/// Entry of the admin user listing.
///
/// `password` carries the bcrypt hash only when the server is configured
/// with `security.expose_password_hashes = true`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListItem {
    #[serde(flatten)]
    pub user: UserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserListItem {
    pub fn from_user(user: User, expose_hash: bool) -> Self {
        let password = expose_hash.then(|| user.password_hash.clone());
        Self {
            user: UserDto::from(user),
            password,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_adm: bool,
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            is_admin: r.is_adm,
        }
    }
}

/// Update user request; absent or empty fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
        }
    }
}
