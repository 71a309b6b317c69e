//! HTTP REST API interfaces
//!
//! - `middleware`: bearer-token authentication and per-route access policy
//! - `modules`: request handlers and DTOs grouped by resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;


pub use router::{create_api_router, ApiState, RouterOptions};
