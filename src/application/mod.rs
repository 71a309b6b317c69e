//! Application layer: use-case orchestration over the domain ports.

pub mod identity;

pub use identity::UserService;
