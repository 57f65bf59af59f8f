//! Livestream repository.

use livepipe_core::{LivestreamId, UserId};
use rusqlite::{params, Connection};
use tracing::instrument;

use super::query_in;
use crate::errors::Result;
use crate::row_types::{LivestreamRow, NewLivestream};

/// Livestream repository: stateless, every method takes `&Connection`.
pub struct LivestreamRepo;

impl LivestreamRepo {
    pub fn insert(conn: &Connection, livestream: &NewLivestream) -> Result<LivestreamRow> {
        let _ = conn.execute(
            "INSERT INTO livestreams (user_id, title, description, playlist_url,
                 thumbnail_url, start_at, end_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                livestream.user_id.get(),
                livestream.title,
                livestream.description,
                livestream.playlist_url,
                livestream.thumbnail_url,
                livestream.start_at,
                livestream.end_at
            ],
        )?;
        Ok(LivestreamRow {
            id: LivestreamId::new(conn.last_insert_rowid()),
            user_id: livestream.user_id,
            title: livestream.title.clone(),
            description: livestream.description.clone(),
            playlist_url: livestream.playlist_url.clone(),
            thumbnail_url: livestream.thumbnail_url.clone(),
            start_at: livestream.start_at,
            end_at: livestream.end_at,
        })
    }

    /// Fetch livestreams by id in one statement.
    #[instrument(skip(conn, ids), fields(count = ids.len()))]
    pub fn get_by_ids(conn: &Connection, ids: &[LivestreamId]) -> Result<Vec<LivestreamRow>> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        query_in(
            conn,
            "SELECT id, user_id, title, description, playlist_url, thumbnail_url,
                    start_at, end_at
             FROM livestreams WHERE id IN ({in})",
            &raw,
            |row| {
                Ok(LivestreamRow {
                    id: LivestreamId::new(row.get(0)?),
                    user_id: UserId::new(row.get(1)?),
                    title: row.get(2)?,
                    description: row.get(3)?,
                    playlist_url: row.get(4)?,
                    thumbnail_url: row.get(5)?,
                    start_at: row.get(6)?,
                    end_at: row.get(7)?,
                })
            },
        )
    }
}
