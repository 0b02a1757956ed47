//! Marginalia Core Library
//!
//! Core functionality for the marginalia note-matching service.
//!
//! # Features
//! - SQLite-backed storage of text chunks with their embeddings
//! - Cosine-distance nearest-neighbor search via an HNSW index,
//!   fully rebuilt from the store on every mutation
//! - Line-number mapping from a chunk back to its source document
//! - External embedding service client (OpenAI-compatible)

pub mod config;
pub mod db;
pub mod embed;
pub mod error;
pub mod index;
pub mod linemap;
pub mod service;

pub use config::{Config, EmbeddingServiceConfig};
pub use db::{ChunkRecord, Database};
pub use embed::{Embedder, HttpEmbedder};
pub use error::{Error, MarginaliaError, Result};
pub use index::{ChunkIndex, Neighbor};
pub use linemap::{locate_chunk, LineSpan};
pub use service::{ChunkMatch, ChunkService};

/// Embedding dimension used when none is configured.
///
/// Matches sentence-transformers/all-MiniLM-L6-v2, the default encoder.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "marginalia";
