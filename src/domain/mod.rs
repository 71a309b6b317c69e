//! Domain layer: the user aggregate and its repository port.

pub mod user;

pub use user::{CreateUserDto, UpdateUserDto, User, UserRepositoryInterface};

// Re-export the error types from shared for convenience
pub use crate::shared::{DomainError, DomainResult};
