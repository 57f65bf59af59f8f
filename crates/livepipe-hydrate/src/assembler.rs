//! Joins raw reaction facts with resolved entity maps.

use std::collections::HashMap;

use livepipe_core::{Livestream, LivestreamId, Reaction, User, UserId};
use livepipe_store::ReactionRow;
use tracing::debug;

/// One [`Reaction`] per fact, in fact order. A fact whose user or livestream
/// is missing from the maps gets the zero entity in that slot.
pub fn assemble(
    facts: &[ReactionRow],
    users: &HashMap<UserId, User>,
    livestreams: &HashMap<LivestreamId, Livestream>,
) -> Vec<Reaction> {
    facts
        .iter()
        .map(|fact| {
            let user = users.get(&fact.user_id).cloned().unwrap_or_else(|| {
                debug!(reaction_id = %fact.id, user_id = %fact.user_id, "user not found, using zero value");
                User::default()
            });
            let livestream = livestreams
                .get(&fact.livestream_id)
                .cloned()
                .unwrap_or_else(|| {
                    debug!(
                        reaction_id = %fact.id,
                        livestream_id = %fact.livestream_id,
                        "livestream not found, using zero value"
                    );
                    Livestream::default()
                });
            Reaction {
                id: fact.id,
                emoji_name: fact.emoji_name.clone(),
                user,
                livestream,
                created_at: fact.created_at,
            }
        })
        .collect()
}
