//! # livepipe-hydrate
//!
//! Turns raw reaction rows into fully nested responses without N+1 queries.
//!
//! - **[`resolver`]**: one batched `IN (…)` lookup per key type, keys deduplicated
//! - **[`hydrator`]**: users (theme, icon hash), livestreams (owner, tags), reactions
//! - **[`assembler`]**: order-preserving join with zero-value substitution
//! - **[`service`]**: list and post flows, each inside one unit of work

#![deny(unsafe_code)]

pub mod assembler;
pub mod hydrator;
pub mod resolver;
pub mod service;

pub use assembler::assemble;
pub use hydrator::{fallback_icon_hash, icon_hash, LivestreamHydrator, ReactionHydrator, UserHydrator};
pub use resolver::{BatchLookup, BatchResolver};
pub use service::{ReactionService, ServiceError};
