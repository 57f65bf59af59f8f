//! Request orchestration for listing and posting reactions.
//!
//! Each call runs in exactly one unit of work: read or write the facts,
//! hydrate them, then commit. Any failure rolls everything back. Calls are
//! synchronous and belong on a blocking thread.

use std::sync::Arc;

use livepipe_core::{AuthenticatedUser, Limit, LivestreamId, Reaction, ReactionId};
use livepipe_store::{
    unit_of_work, ConnectionProvider, NewReaction, ReactionRepo, StoreError, UnitMode,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::hydrator::ReactionHydrator;

/// Errors from [`ReactionService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The list query itself failed.
    #[error("failed to get reactions: {0}")]
    ListFacts(#[source] StoreError),

    /// Any other store failure: insert, hydration or commit.
    #[error("store error: {0}")]
    Store(#[source] StoreError),

    /// Hydrating a just-written row produced no reaction.
    #[error("reaction {0} was written but not hydrated")]
    Unhydrated(ReactionId),

    /// The request went away before the unit of work committed.
    #[error("request cancelled")]
    Cancelled,
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Store(other),
        }
    }
}

/// Result alias for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Lists and posts hydrated reactions.
#[derive(Clone)]
pub struct ReactionService {
    provider: Arc<dyn ConnectionProvider>,
    hydrator: ReactionHydrator,
}

impl ReactionService {
    /// Serve units of work from `provider`.
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            hydrator: ReactionHydrator::new(),
        }
    }

    /// Reactions of a livestream, newest first, fully hydrated. An unknown
    /// livestream yields an empty list.
    #[instrument(skip_all, fields(livestream_id = %livestream_id, limit = ?limit))]
    pub fn list_reactions(
        &self,
        livestream_id: LivestreamId,
        limit: Option<Limit>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Reaction>> {
        unit_of_work::run(self.provider.as_ref(), UnitMode::ReadOnly, cancel, |unit| {
            let facts = ReactionRepo::list_for_livestream(unit.conn(), livestream_id, limit)
                .map_err(|err| match err {
                    StoreError::Cancelled => ServiceError::Cancelled,
                    other => ServiceError::ListFacts(other),
                })?;
            unit.checkpoint()?;
            Ok(self.hydrator.hydrate(unit.conn(), &facts)?)
        })
    }

    /// Record a reaction by `user` and return it hydrated. The stored row is
    /// only committed once hydration succeeded.
    #[instrument(skip_all, fields(user_id = %user.user_id, livestream_id = %livestream_id))]
    pub fn post_reaction(
        &self,
        user: AuthenticatedUser,
        livestream_id: LivestreamId,
        emoji_name: String,
        cancel: &CancellationToken,
    ) -> Result<Reaction> {
        let reaction = NewReaction {
            emoji_name,
            user_id: user.user_id,
            livestream_id,
            created_at: chrono::Utc::now().timestamp(),
        };

        let hydrated = unit_of_work::run(self.provider.as_ref(), UnitMode::ReadWrite, cancel, |unit| {
            let row = ReactionRepo::insert(unit.conn(), &reaction)?;
            unit.checkpoint()?;
            let mut hydrated = self.hydrator.hydrate(unit.conn(), std::slice::from_ref(&row))?;
            hydrated.pop().ok_or(ServiceError::Unhydrated(row.id))
        })?;

        info!(reaction_id = %hydrated.id, "reaction posted");
        Ok(hydrated)
    }
}
