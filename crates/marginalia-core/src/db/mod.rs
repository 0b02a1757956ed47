//! Database layer for marginalia
//!
//! SQLite-backed storage of text chunks and their embeddings. The chunk
//! table is the source of truth; the nearest-neighbor index is a derived
//! cache rebuilt from it.

mod chunks;
mod schema;
pub mod vectors;

pub use chunks::ChunkRecord;
pub use schema::Database;

use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        std::env::var("MARGINALIA_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(crate::CACHE_DIR_NAME)
                    .join("chunks.sqlite")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: both cases touch MARGINALIA_DB, and the test runner
    // is parallel.
    #[test]
    fn test_default_path_anchoring_and_env_override() {
        std::env::remove_var("MARGINALIA_DB");
        let path = Database::default_path();
        assert!(path.ends_with("marginalia/chunks.sqlite"));
        if let Some(cache) = dirs::cache_dir() {
            assert!(path.starts_with(cache));
        }

        std::env::set_var("MARGINALIA_DB", "/tmp/override.sqlite");
        let overridden = Database::default_path();
        std::env::remove_var("MARGINALIA_DB");
        assert_eq!(overridden, PathBuf::from("/tmp/override.sqlite"));
    }
}
