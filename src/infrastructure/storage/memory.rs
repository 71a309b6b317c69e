//! In-memory user storage

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::messages;
use crate::domain::{DomainError, DomainResult, User, UserRepositoryInterface};

/// Process-lifetime user store.
///
/// Records live in a `Vec` so listing keeps creation order. Every method
/// takes the lock once, which keeps check-then-insert on email atomic.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, user: User) -> DomainResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(
                messages::EMAIL_ALREADY_REGISTERED.into(),
            ));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count_users(&self) -> DomainResult<usize> {
        Ok(self.users.read().await.len())
    }

    async fn replace_user(&self, id: &str, user: User) -> DomainResult<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(slot) => {
                *slot = user;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: &str) -> DomainResult<bool> {
        let mut users = self.users.write().await;
        match users.iter().position(|u| u.id == id) {
            Some(index) => {
                users.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User::new(name, email, "hash", false)
    }

    #[tokio::test]
    async fn create_keeps_insertion_order() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(user("A", "a@x.com")).await.unwrap();
        repo.create_user(user("B", "b@x.com")).await.unwrap();
        repo.create_user(user("C", "c@x.com")).await.unwrap();

        let names: Vec<_> = repo
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_mutation() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(user("A", "a@x.com")).await.unwrap();

        let err = repo.create_user(user("A2", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookups_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create_user(user("A", "a@x.com")).await.unwrap();

        assert_eq!(repo.get_user_by_id(&a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(repo.get_user_by_email("a@x.com").await.unwrap(), Some(a));
        assert_eq!(repo.get_user_by_id("missing").await.unwrap(), None);
        assert_eq!(repo.get_user_by_email("nobody@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_overwrites_matching_slot_only() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create_user(user("A", "a@x.com")).await.unwrap();
        let b = repo.create_user(user("B", "b@x.com")).await.unwrap();

        let mut renamed = a.clone();
        renamed.name = "Renamed".into();
        assert!(repo.replace_user(&a.id, renamed).await.unwrap());
        assert!(!repo.replace_user("missing", b.clone()).await.unwrap());

        let users = repo.list_users().await.unwrap();
        assert_eq!(users[0].name, "Renamed");
        assert_eq!(users[1], b);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create_user(user("A", "a@x.com")).await.unwrap();
        repo.create_user(user("B", "b@x.com")).await.unwrap();

        assert!(repo.delete_user(&a.id).await.unwrap());
        assert!(!repo.delete_user(&a.id).await.unwrap());
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }
}
