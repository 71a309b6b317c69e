//! # Users Service
//!
//! User registration and JWT authentication over an in-memory store,
//! exposed as a JSON HTTP API.
//!
//! ## Architecture
//!
//! - **domain**: User entity, DTOs and the repository contract
//! - **application**: Registration, login and authorization rules
//! - **infrastructure**: In-memory store, bcrypt hashing and JWT signing
//! - **interfaces**: HTTP router, auth middleware and handlers
//! - **server**: Runtime lifecycle and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use interfaces::http::{create_api_router, RouterOptions};

pub use server::{init_tracing, ServerHandle, ServerOptions};
