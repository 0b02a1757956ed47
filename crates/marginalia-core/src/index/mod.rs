//! HNSW nearest-neighbor index over stored chunk embeddings
//!
//! The index is a disposable cache of the `text_chunks` table: every
//! mutation of the store is followed by a full [`ChunkIndex::rebuild`],
//! which constructs a fresh index and swaps it in whole. There is no
//! incremental insert or delete against a live index; that trade-off is
//! part of the contract this module preserves.

use crate::db::vectors::cosine_similarity;
use crate::db::Database;
use crate::error::{MarginaliaError, Result};
use instant_distance::{Builder, HnswMap, Search};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Wrapper for f32 vectors implementing instant_distance::Point
#[derive(Clone)]
struct EmbeddingPoint {
    values: Vec<f32>,
}

impl instant_distance::Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1.0 - cosine_similarity
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

/// A nearest-neighbor hit: chunk id and cosine distance (lower is closer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: i64,
    pub distance: f32,
}

/// HNSW-backed nearest-neighbor index over chunk embeddings.
///
/// Two states: Empty (`None`, no chunks in the store at last rebuild) and
/// Built. Queries against the Empty state return no results rather than
/// erroring.
pub struct ChunkIndex {
    index: RwLock<Option<HnswMap<EmbeddingPoint, i64>>>,
    dimensions: usize,
    chunk_count: AtomicUsize,
}

impl ChunkIndex {
    /// Create an empty index expecting embeddings of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            index: RwLock::new(None),
            dimensions,
            chunk_count: AtomicUsize::new(0),
        }
    }

    /// Rebuild the index from the current store contents.
    ///
    /// Reads every chunk; zero chunks clears the index (Empty state),
    /// otherwise a fresh index over all embeddings, labeled by chunk id,
    /// replaces the previous one atomically. Callers mutating the store
    /// must call this before trusting [`ChunkIndex::query`] again.
    pub fn rebuild(&self, db: &Database) -> Result<()> {
        let chunks = db.all_chunks()?;
        let count = chunks.len();

        if count == 0 {
            *self.index.write().map_err(|e| {
                MarginaliaError::Index(format!("index lock poisoned: {}", e))
            })? = None;
            self.chunk_count.store(0, Ordering::Relaxed);
            tracing::debug!("Cleared index: store is empty");
            return Ok(());
        }

        let mut points = Vec::with_capacity(count);
        let mut ids = Vec::with_capacity(count);
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(MarginaliaError::InvalidInput(format!(
                    "chunk {} has embedding dimension {} (expected {})",
                    chunk.id,
                    chunk.embedding.len(),
                    self.dimensions
                )));
            }
            points.push(EmbeddingPoint {
                values: chunk.embedding,
            });
            ids.push(chunk.id);
        }

        // Search breadth must cover the whole store, or queries with a
        // large k would be capped below min(k, count) by the default
        // candidate pool.
        let hnsw_map = Builder::default().ef_search(count.max(100)).build(points, ids);

        *self.index.write().map_err(|e| {
            MarginaliaError::Index(format!("index lock poisoned: {}", e))
        })? = Some(hnsw_map);
        self.chunk_count.store(count, Ordering::Relaxed);

        tracing::info!("Rebuilt index with {} chunks", count);
        Ok(())
    }

    /// Search for the k nearest chunks by cosine distance, nearest first.
    ///
    /// Returns an empty vec in the Empty state. `k` larger than the stored
    /// chunk count is silently clamped; any smaller `k` is honored in full
    /// because the search breadth is sized from the store at rebuild. A
    /// query embedding of the wrong dimension is a caller error.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if embedding.len() != self.dimensions {
            return Err(MarginaliaError::InvalidInput(format!(
                "query embedding dimension {} (expected {})",
                embedding.len(),
                self.dimensions
            )));
        }

        let guard = self.index.read().map_err(|e| {
            MarginaliaError::Index(format!("index lock poisoned: {}", e))
        })?;

        let map = match guard.as_ref() {
            Some(m) => m,
            None => return Ok(vec![]),
        };

        let query_point = EmbeddingPoint {
            values: embedding.to_vec(),
        };
        let mut search = Search::default();

        let neighbors = map
            .search(&query_point, &mut search)
            .take(k)
            .map(|item| Neighbor {
                id: *item.value,
                distance: item.distance,
            })
            .collect();

        Ok(neighbors)
    }

    /// Whether the index has been built (non-empty store at last rebuild)
    pub fn is_built(&self) -> bool {
        self.index.read().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Number of chunks covered by the last rebuild
    pub fn len(&self) -> usize {
        self.chunk_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured embedding dimension
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
