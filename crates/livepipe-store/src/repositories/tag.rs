//! Tag repository: the `tags` catalogue and the `livestream_tags` join table.

use livepipe_core::{LivestreamId, TagId};
use rusqlite::{params, Connection};
use tracing::instrument;

use super::query_in;
use crate::errors::Result;
use crate::row_types::{LivestreamTagRow, TagRow};

/// Tag repository: stateless, every method takes `&Connection`.
pub struct TagRepo;

impl TagRepo {
    pub fn insert(conn: &Connection, name: &str) -> Result<TagRow> {
        let _ = conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        Ok(TagRow {
            id: TagId::new(conn.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    /// Attach a tag to a livestream.
    pub fn attach(conn: &Connection, livestream_id: LivestreamId, tag_id: TagId) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO livestream_tags (livestream_id, tag_id) VALUES (?1, ?2)",
            params![livestream_id.get(), tag_id.get()],
        )?;
        Ok(())
    }

    /// Tags for every given livestream in one joined statement, in the order
    /// they were attached.
    #[instrument(skip(conn, livestream_ids), fields(count = livestream_ids.len()))]
    pub fn get_by_livestream_ids(
        conn: &Connection,
        livestream_ids: &[LivestreamId],
    ) -> Result<Vec<LivestreamTagRow>> {
        let raw: Vec<i64> = livestream_ids.iter().map(|id| id.get()).collect();
        query_in(
            conn,
            "SELECT lt.livestream_id, t.id, t.name
             FROM livestream_tags lt
             JOIN tags t ON t.id = lt.tag_id
             WHERE lt.livestream_id IN ({in})
             ORDER BY lt.id",
            &raw,
            |row| {
                Ok(LivestreamTagRow {
                    livestream_id: LivestreamId::new(row.get(0)?),
                    tag: TagRow {
                        id: TagId::new(row.get(1)?),
                        name: row.get(2)?,
                    },
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::conn;

    #[test]
    fn get_by_livestream_ids_joins_names() {
        let conn = conn();
        let music = TagRepo::insert(&conn, "music").unwrap();
        let chat = TagRepo::insert(&conn, "chat").unwrap();
        TagRepo::attach(&conn, LivestreamId::new(1), chat.id).unwrap();
        TagRepo::attach(&conn, LivestreamId::new(1), music.id).unwrap();
        TagRepo::attach(&conn, LivestreamId::new(2), music.id).unwrap();

        let rows = TagRepo::get_by_livestream_ids(&conn, &[LivestreamId::new(1)]).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.tag.name.as_str()).collect();
        assert_eq!(names, vec!["chat", "music"]);
        assert!(rows.iter().all(|r| r.livestream_id == LivestreamId::new(1)));
    }

    #[test]
    fn untagged_livestream_yields_nothing() {
        let conn = conn();
        let rows = TagRepo::get_by_livestream_ids(&conn, &[LivestreamId::new(9)]).unwrap();
        assert!(rows.is_empty());
    }
}
