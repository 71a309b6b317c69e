//! Users module: registration, profile, listing, update and deletion

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
