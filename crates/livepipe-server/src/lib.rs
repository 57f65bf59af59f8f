//! # livepipe-server
//!
//! Axum HTTP surface:
//!
//! - `GET /api/livestream/{livestream_id}/reaction?limit=N`
//! - `POST /api/livestream/{livestream_id}/reaction`
//! - `GET /health`
//!
//! Sessions are verified through the [`SessionVerifier`] seam; store work runs
//! on the blocking pool under a per-request deadline.

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use auth::{SessionVerifier, SqliteSessionVerifier, SESSION_COOKIE};
pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, LivepipeServer};
pub use shutdown::ShutdownCoordinator;
