//! User management service: application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::user::messages;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password, DEFAULT_HASH_COST};
use crate::shared::InfraError;

/// User service orchestrating all identity / user-management use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    jwt_config: JwtConfig,
    hash_cost: u32,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(repo: Arc<R>, jwt_config: JwtConfig) -> Self {
        Self {
            repo,
            jwt_config,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Override the bcrypt work factor.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        Ok(hash_password(password, self.hash_cost).map_err(InfraError::from)?)
    }

    // ── Registration ────────────────────────────────────────────

    /// Conflict if `email` already belongs to a user.
    pub async fn ensure_email_available(&self, email: &str) -> DomainResult<()> {
        if self.repo.get_user_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict(
                messages::EMAIL_ALREADY_REGISTERED.into(),
            ));
        }
        Ok(())
    }

    /// Register a new user. The email must not be taken yet.
    pub async fn register(&self, dto: CreateUserDto) -> DomainResult<User> {
        // Checked again atomically by the repository on insert.
        self.ensure_email_available(&dto.email).await?;

        let password_hash = self.hash(&dto.password)?;
        let user = User::new(dto.name, dto.email, password_hash, dto.is_admin);
        let user = self.repo.create_user(user).await?;

        info!(user_id = %user.id, is_admin = user.is_admin, "New user registered");
        Ok(user)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check email + password and sign an access token for the user.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<String> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Err(DomainError::Unauthorized(messages::WRONG_CREDENTIALS.into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(DomainError::Unauthorized(messages::WRONG_CREDENTIALS.into()));
        }

        let token = create_token(&user.id, &user.email, &self.jwt_config)?;

        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// All users in creation order.
    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.repo.get_user_by_id(id).await
    }

    pub async fn count_users(&self) -> DomainResult<usize> {
        self.repo.count_users().await
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Update `target_id` on behalf of `actor`.
    ///
    /// Non-admins may only update themselves. Non-empty `name`, `email` and
    /// `password` overwrite the stored values; `updated_at` always moves.
    pub async fn update_user(
        &self,
        actor: &User,
        target_id: &str,
        dto: UpdateUserDto,
    ) -> DomainResult<User> {
        if !actor.is_admin && actor.id != target_id {
            return Err(DomainError::Forbidden(
                messages::MISSING_AUTHORIZATION.into(),
            ));
        }

        let mut updated = if actor.id == target_id {
            actor.clone()
        } else {
            self.repo
                .get_user_by_id(target_id)
                .await?
                .ok_or_else(|| DomainError::user_not_found(target_id))?
        };

        if let Some(name) = dto.name() {
            updated.name = name.to_string();
        }
        if let Some(email) = dto.email() {
            updated.email = email.to_string();
        }
        if let Some(password) = dto.password() {
            updated.password_hash = self.hash(password)?;
        }
        updated.updated_at = Utc::now();

        if !self.repo.replace_user(target_id, updated.clone()).await? {
            return Err(DomainError::user_not_found(target_id));
        }

        info!(user_id = %target_id, actor_id = %actor.id, "User updated");
        Ok(updated)
    }

    /// Delete a user. Only admins may delete; a missing id is not an error.
    pub async fn delete_user(&self, actor_is_admin: bool, target_id: &str) -> DomainResult<()> {
        if !actor_is_admin {
            return Err(DomainError::Forbidden(
                messages::MISSING_ADMIN_PERMISSIONS.into(),
            ));
        }

        if self.repo.delete_user(target_id).await? {
            info!(user_id = %target_id, "User deleted");
        } else {
            debug!(user_id = %target_id, "Delete requested for unknown user");
        }
        Ok(())
    }
}
