//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

pub mod messages;

mod dto_create;
mod dto_update;

pub use model::User;

pub use dto_create::CreateUserDto;
pub use dto_update::UpdateUserDto;

pub use repository::UserRepositoryInterface;
