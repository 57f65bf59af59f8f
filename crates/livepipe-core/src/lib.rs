//! # livepipe-core
//!
//! Types shared by every livepipe crate:
//!
//! - **[`ids`]**: typed integer identifiers for users, livestreams, reactions, tags, themes
//! - **[`limit`]**: validated `LIMIT` values for list queries
//! - **[`model`]**: hydrated response entities (`Reaction`, `User`, `Livestream`, ...)
//! - **[`errors`]**: client-facing validation and authentication errors
//! - **[`auth`]**: the typed result of a successful session verification

#![deny(unsafe_code)]

pub mod auth;
pub mod errors;
pub mod ids;
pub mod limit;
pub mod model;

pub use auth::AuthenticatedUser;
pub use errors::{AuthError, ValidationError};
pub use ids::{LivestreamId, ReactionId, TagId, ThemeId, UserId};
pub use limit::Limit;
pub use model::{Livestream, Reaction, Tag, Theme, User};
