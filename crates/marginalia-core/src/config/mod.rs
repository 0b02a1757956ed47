//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Database path override (falls back to MARGINALIA_DB or the cache dir)
    #[serde(default)]
    pub database: Option<PathBuf>,
}

/// Embedding service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embedding service (OpenAI-compatible)
    pub url: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("MARGINALIA_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_embedding_model(),
            dimensions: std::env::var("MARGINALIA_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_dimensions),
            api_key: std::env::var("MARGINALIA_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_embedding_model() -> String {
    std::env::var("MARGINALIA_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_dimensions() -> usize {
    crate::DEFAULT_DIMENSIONS
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load config from an explicit path, falling back to defaults if absent
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                let config: Config = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            _ => Ok(Config::default()),
        }
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.embedding.dimensions > 0);
        assert!(!config.embedding.model.is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        let mut config = Config::default();
        config.embedding.url = "http://embeddings.local:9000".to_string();
        config.embedding.dimensions = 768;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.embedding.url, "http://embeddings.local:9000");
        assert_eq!(loaded.embedding.dimensions, 768);
    }

    #[test]
    fn test_load_missing_path_falls_back_to_default() {
        let loaded = Config::load(Some(std::path::Path::new("/nonexistent/config.yaml"))).unwrap();
        assert_eq!(loaded.database, None);
    }
}
