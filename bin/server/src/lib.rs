//! gatehouse HTTP service.
//!
//! This crate wires the identity provider client, the login flow, and the
//! request authenticator into an axum application.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;

pub use app::build_router;
pub use auth::AppState;
pub use config::ServerConfig;
pub use error::StartupError;
