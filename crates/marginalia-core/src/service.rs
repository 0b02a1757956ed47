//! Chunk service: storage, index, and encoder wired together
//!
//! Owns the database, the nearest-neighbor index, and the embedder as one
//! dependency-injected unit. Every mutation rebuilds the index before
//! returning, so callers of [`ChunkService::match_note`] never observe a
//! stale index.

use crate::db::Database;
use crate::embed::Embedder;
use crate::error::{MarginaliaError, Result};
use crate::index::ChunkIndex;
use crate::linemap::{locate_chunk, LineSpan};
use std::sync::{Arc, Mutex, MutexGuard};

/// A resolved nearest-neighbor match for a note.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMatch {
    pub id: i64,
    pub content: String,
    pub start_index: i64,
    pub end_index: i64,
    pub distance: f32,
}

/// Service instance owning the chunk store and its derived index.
///
/// The store is the source of truth; the index is a cache rebuilt in full
/// after every mutation. Writes are serialized through an internal lock
/// (single-process, single-writer design).
pub struct ChunkService {
    db: Mutex<Database>,
    index: ChunkIndex,
    embedder: Arc<dyn Embedder>,
}

impl ChunkService {
    /// Create a service over an initialized database. The index starts
    /// empty and is brought up to date from the store immediately.
    pub fn new(db: Database, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let index = ChunkIndex::new(embedder.dimensions());
        index.rebuild(&db)?;
        Ok(Self {
            db: Mutex::new(db),
            index,
            embedder,
        })
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| MarginaliaError::Other(anyhow::anyhow!("store lock poisoned: {}", e)))
    }

    /// Encode, persist, and index a new chunk. Returns its id.
    pub async fn add_chunk(
        &self,
        content: &str,
        start_index: i64,
        end_index: i64,
    ) -> Result<i64> {
        let embedding = self.embedder.embed(content).await?;

        let db = self.db()?;
        let id = db.insert_chunk(content, &embedding, start_index, end_index)?;
        self.index.rebuild(&db)?;

        tracing::debug!(id, start_index, end_index, "Added chunk");
        Ok(id)
    }

    /// Delete a chunk by id and rebuild the index. Deleting a nonexistent
    /// id is a no-op success.
    pub async fn delete_chunk(&self, id: i64) -> Result<()> {
        let db = self.db()?;
        let removed = db.delete_chunk(id)?;
        self.index.rebuild(&db)?;

        tracing::debug!(id, removed, "Deleted chunk");
        Ok(())
    }

    /// Encode a note and return its k nearest stored chunks, nearest
    /// first. An empty store yields an empty vec, not an error.
    pub async fn match_note(&self, content: &str, k: usize) -> Result<Vec<ChunkMatch>> {
        let embedding = self.embedder.embed(content).await?;

        let neighbors = self.index.query(&embedding, k)?;

        let db = self.db()?;
        let mut matches = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            if let Some(record) = db.get_chunk(neighbor.id)? {
                matches.push(ChunkMatch {
                    id: record.id,
                    content: record.content,
                    start_index: record.start_index,
                    end_index: record.end_index,
                    distance: neighbor.distance,
                });
            }
        }

        Ok(matches)
    }

    /// Map a stored chunk back to its line span within a caller-supplied
    /// original document. Returns None for an unknown id.
    pub fn locate(&self, original: &str, id: i64) -> Result<Option<LineSpan>> {
        let db = self.db()?;
        let Some(record) = db.get_chunk(id)? else {
            return Ok(None);
        };
        Ok(Some(locate_chunk(original, &record.content, true)))
    }

    /// Number of stored chunks.
    pub fn chunk_count(&self) -> Result<usize> {
        self.db()?.count_chunks()
    }

    /// The embedding model in use.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}
