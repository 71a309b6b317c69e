use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;

/// Storage port for user records.
///
/// Implementations keep insertion order; `list_users` returns records in
/// the order they were created.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Append a user. Fails with `DomainError::Conflict` when the email is
    /// already taken; the check and the insert are atomic.
    async fn create_user(&self, user: User) -> DomainResult<User>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn count_users(&self) -> DomainResult<usize>;

    /// Overwrite the record stored under `id`. Returns `false` if no slot matched.
    async fn replace_user(&self, id: &str, user: User) -> DomainResult<bool>;

    /// Remove the first record with `id`. Returns `false` if none matched.
    async fn delete_user(&self, id: &str) -> DomainResult<bool>;
}
