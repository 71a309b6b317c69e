use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Request body is missing required keys or carries values of the wrong type.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Credentials were rejected (bad email/password).
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_found(id: &str) -> Self {
        DomainError::NotFound {
            entity: "User",
            field: "uuid",
            value: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Token lifetime of {0}h is out of range")]
    TokenLifetime(i64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::Internal(err.to_string())
    }
}
