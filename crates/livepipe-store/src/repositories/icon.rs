//! Icon repository. Icons are raw image bytes keyed by owner.

use livepipe_core::UserId;
use rusqlite::{params, Connection};
use tracing::instrument;

use super::query_in;
use crate::errors::Result;
use crate::row_types::IconRow;

/// Icon repository: stateless, every method takes `&Connection`.
pub struct IconRepo;

impl IconRepo {
    pub fn insert(conn: &Connection, user_id: UserId, image: &[u8]) -> Result<IconRow> {
        let _ = conn.execute(
            "INSERT INTO icons (user_id, image) VALUES (?1, ?2)",
            params![user_id.get(), image],
        )?;
        Ok(IconRow {
            id: conn.last_insert_rowid(),
            user_id,
            image: image.to_vec(),
        })
    }

    /// Icons for the given owners, one statement. A user who uploaded more
    /// than once has several rows; they come back in upload order so the
    /// newest one is last.
    #[instrument(skip(conn, user_ids), fields(count = user_ids.len()))]
    pub fn get_by_user_ids(conn: &Connection, user_ids: &[UserId]) -> Result<Vec<IconRow>> {
        let raw: Vec<i64> = user_ids.iter().map(|id| id.get()).collect();
        query_in(
            conn,
            "SELECT id, user_id, image FROM icons WHERE user_id IN ({in}) ORDER BY id",
            &raw,
            |row| {
                Ok(IconRow {
                    id: row.get(0)?,
                    user_id: UserId::new(row.get(1)?),
                    image: row.get(2)?,
                })
            },
        )
    }
}
