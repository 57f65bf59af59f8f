//! # livepipe-store
//!
//! `SQLite` storage for livestream reactions and the entities they point at.
//!
//! - **Connection**: `r2d2` pool with WAL pragmas, exposed through the
//!   [`ConnectionProvider`] seam
//! - **Migrations**: embedded SQL applied in version order
//! - **Repositories**: stateless structs whose methods take `&Connection`;
//!   multi-key lookups are one `IN (…)` statement each
//! - **Unit of work**: one transaction per request, committed on success
//!   and rolled back on failure or cancellation

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;
pub mod unit_of_work;

pub use connection::{
    new_file, new_in_memory, ConnectionConfig, ConnectionPool, ConnectionProvider,
    PooledConnection,
};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use repositories::{
    icon::IconRepo, livestream::LivestreamRepo, reaction::ReactionRepo, session::SessionRepo,
    tag::TagRepo, theme::ThemeRepo, user::UserRepo,
};
pub use row_types::{
    IconRow, LivestreamRow, LivestreamTagRow, NewLivestream, NewReaction, NewUser, ReactionRow,
    SessionRow, TagRow, ThemeRow, UserRow,
};
pub use unit_of_work::{run, Outcome, UnitMode, UnitOfWork};
