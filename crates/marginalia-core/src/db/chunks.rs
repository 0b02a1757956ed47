//! Chunk storage operations
//!
//! CRUD over the `text_chunks` table. Chunks are immutable once stored:
//! there is no update path, only insert and delete. Ids come from SQLite
//! AUTOINCREMENT and are never reused within a process lifetime.

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::Database;
use crate::error::Result;
use rusqlite::params;

/// A stored chunk row: content, embedding, and its character span in the
/// source document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub id: i64,
    pub content: String,
    pub embedding: Vec<f32>,
    pub start_index: i64,
    pub end_index: i64,
}

impl Database {
    /// Insert a chunk with its embedding; returns the auto-assigned id.
    ///
    /// The span is caller-supplied and not validated against the content.
    pub fn insert_chunk(
        &self,
        content: &str,
        embedding: &[f32],
        start_index: i64,
        end_index: i64,
    ) -> Result<i64> {
        let blob = embedding_to_bytes(embedding);
        self.conn.execute(
            "INSERT INTO text_chunks (content, embedding, start_index, end_index)
             VALUES (?1, ?2, ?3, ?4)",
            params![content, blob, start_index, end_index],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete a chunk by id. Returns the number of rows removed;
    /// a nonexistent id is a no-op, not an error.
    pub fn delete_chunk(&self, id: i64) -> Result<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM text_chunks WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// Full scan of all stored chunks.
    pub fn all_chunks(&self) -> Result<Vec<ChunkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, embedding, start_index, end_index FROM text_chunks",
        )?;

        let results = stmt
            .query_map([], |row| {
                let blob: Vec<u8> = row.get(2)?;
                Ok(ChunkRecord {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    embedding: bytes_to_embedding(&blob),
                    start_index: row.get(3)?,
                    end_index: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Look up a single chunk by id.
    pub fn get_chunk(&self, id: i64) -> Result<Option<ChunkRecord>> {
        let result = self.conn.query_row(
            "SELECT id, content, embedding, start_index, end_index
             FROM text_chunks WHERE id = ?1",
            params![id],
            |row| {
                let blob: Vec<u8> = row.get(2)?;
                Ok(ChunkRecord {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    embedding: bytes_to_embedding(&blob),
                    start_index: row.get(3)?,
                    end_index: row.get(4)?,
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count stored chunks.
    pub fn count_chunks(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM text_chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_insert_returns_monotonic_ids() {
        let db = test_db();
        let e = vec![0.1f32, 0.2, 0.3];

        let a = db.insert_chunk("first", &e, 0, 5).unwrap();
        let b = db.insert_chunk("second", &e, 5, 11).unwrap();
        let c = db.insert_chunk("third", &e, 11, 16).unwrap();

        assert!(b > a);
        assert!(c > b);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = test_db();
        let e = vec![1.0f32, 0.0];

        let a = db.insert_chunk("a", &e, 0, 1).unwrap();
        let b = db.insert_chunk("b", &e, 1, 2).unwrap();
        db.delete_chunk(b).unwrap();

        // AUTOINCREMENT: the next id must be beyond every id ever assigned
        let c = db.insert_chunk("c", &e, 2, 3).unwrap();
        assert!(c > b);
        assert!(c > a);
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let db = test_db();
        let rows = db.delete_chunk(42).unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_embedding_survives_roundtrip() {
        let db = test_db();
        let e = vec![0.25f32, -1.5, 3.75, 0.0];

        let id = db.insert_chunk("hello", &e, 3, 8).unwrap();
        let record = db.get_chunk(id).unwrap().unwrap();

        assert_eq!(record.content, "hello");
        assert_eq!(record.embedding, e);
        assert_eq!(record.start_index, 3);
        assert_eq!(record.end_index, 8);
    }

    #[test]
    fn test_get_chunk_missing() {
        let db = test_db();
        assert!(db.get_chunk(7).unwrap().is_none());
    }

    #[test]
    fn test_all_chunks_and_count() {
        let db = test_db();
        let e = vec![0.0f32; 4];

        assert_eq!(db.count_chunks().unwrap(), 0);
        db.insert_chunk("x", &e, 0, 1).unwrap();
        db.insert_chunk("y", &e, 1, 2).unwrap();

        let all = db.all_chunks().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(db.count_chunks().unwrap(), 2);
    }
}
