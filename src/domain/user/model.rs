use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User model
///
/// Holds the bcrypt hash; never serialize this type directly, map it to a
/// public DTO first.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with a random v4 id and both timestamps set to now.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_get_distinct_ids() {
        let a = User::new("A", "a@x.com", "hash", false);
        let b = User::new("B", "b@x.com", "hash", true);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }
}
