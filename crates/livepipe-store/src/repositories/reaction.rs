//! Reaction repository: list and insert for the `reactions` table.
//!
//! Rows come back with `user_id` and `livestream_id` unresolved; the
//! hydration layer batches those lookups.

use livepipe_core::{Limit, LivestreamId, ReactionId, UserId};
use rusqlite::{params, Connection};
use tracing::instrument;

use crate::errors::Result;
use crate::row_types::{NewReaction, ReactionRow};

const LIST_SQL: &str = "SELECT id, emoji_name, user_id, livestream_id, created_at
     FROM reactions
     WHERE livestream_id = ?1
     ORDER BY created_at DESC, id DESC";

const LIST_LIMITED_SQL: &str = "SELECT id, emoji_name, user_id, livestream_id, created_at
     FROM reactions
     WHERE livestream_id = ?1
     ORDER BY created_at DESC, id DESC
     LIMIT ?2";

/// Reaction repository: stateless, every method takes `&Connection`.
pub struct ReactionRepo;

impl ReactionRepo {
    /// Reactions of one livestream, newest first. Equal timestamps fall back
    /// to the higher id first so the order is total.
    #[instrument(skip_all, fields(livestream_id = %livestream_id, limit = ?limit))]
    pub fn list_for_livestream(
        conn: &Connection,
        livestream_id: LivestreamId,
        limit: Option<Limit>,
    ) -> Result<Vec<ReactionRow>> {
        let rows = match limit {
            Some(limit) => {
                let mut stmt = conn.prepare(LIST_LIMITED_SQL)?;
                let rows = stmt
                    .query_map(params![livestream_id.get(), limit.get()], Self::map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(LIST_SQL)?;
                let rows = stmt
                    .query_map(params![livestream_id.get()], Self::map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// Insert a reaction and return the stored row. The id is the one the
    /// store assigned; nothing is read back.
    #[instrument(skip_all, fields(livestream_id = %reaction.livestream_id))]
    pub fn insert(conn: &Connection, reaction: &NewReaction) -> Result<ReactionRow> {
        let _ = conn.execute(
            "INSERT INTO reactions (emoji_name, user_id, livestream_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                reaction.emoji_name,
                reaction.user_id.get(),
                reaction.livestream_id.get(),
                reaction.created_at
            ],
        )?;
        Ok(ReactionRow {
            id: ReactionId::new(conn.last_insert_rowid()),
            emoji_name: reaction.emoji_name.clone(),
            user_id: reaction.user_id,
            livestream_id: reaction.livestream_id,
            created_at: reaction.created_at,
        })
    }

    /// Count reactions for a livestream.
    pub fn count_for_livestream(conn: &Connection, livestream_id: LivestreamId) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM reactions WHERE livestream_id = ?1",
            params![livestream_id.get()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReactionRow> {
        Ok(ReactionRow {
            id: ReactionId::new(row.get(0)?),
            emoji_name: row.get(1)?,
            user_id: UserId::new(row.get(2)?),
            livestream_id: LivestreamId::new(row.get(3)?),
            created_at: row.get(4)?,
        })
    }
}
