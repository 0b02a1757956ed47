//! Marginalia server
//!
//! JSON-over-HTTP service for storing essay chunks and matching notes
//! back to them.

use anyhow::Result;
use clap::Parser;
use marginalia_core::{ChunkService, Config, Database, Embedder, HttpEmbedder};
use std::path::PathBuf;
use std::sync::Arc;

mod routes;

#[derive(Parser, Debug)]
#[command(name = "marginalia", about = "Chunk indexing and note matching service")]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8000", env = "MARGINALIA_BIND")]
    bind: String,

    /// Database path (defaults to MARGINALIA_DB or the local cache dir)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Optional YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let db_path = cli
        .db
        .or_else(|| config.database.clone())
        .unwrap_or_else(Database::default_path);
    let db = Database::open(&db_path)?;
    db.initialize()?;

    let embedder = Arc::new(HttpEmbedder::new(config.embedding.clone())?);
    tracing::info!(
        model = embedder.model_name(),
        dimensions = config.embedding.dimensions,
        db = %db_path.display(),
        "Starting marginalia"
    );

    let service = Arc::new(ChunkService::new(db, embedder)?);
    let app = routes::router(service);

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!("Serving on http://{}", cli.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
