use std::sync::Arc;

use anyhow::Context;

use f1gpt_backend::core::config::{AppPaths, AppSettings, ConfigService};
use f1gpt_backend::core::logging;
use f1gpt_backend::ingest::Ingestor;
use f1gpt_backend::rag::VectorStore;
use f1gpt_backend::state::{build_embedder, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "seed.log");

    let config = ConfigService::new(paths.clone());
    let settings = AppSettings::from_config(&config.load_config()?);

    let embedder = build_embedder(&settings.embedding)
        .context("embedding.base_url must be set to seed the knowledge base")?;
    embedder
        .ensure_loaded()
        .await
        .context("Failed to load embedding model")?;

    let store = open_store(&paths, &settings)
        .await
        .context("Failed to open vector store")?;
    store
        .reset(settings.store.metric)
        .await
        .context("Failed to reset vector store")?;
    tracing::info!(
        "Seeding {} sources into {} ({} metric)",
        settings.ingest.sources.len(),
        store.db_path().display(),
        settings.store.metric
    );

    let ingestor = Ingestor::new(embedder, store.clone(), &settings.ingest)?;
    let report = ingestor.ingest_sources(&settings.ingest.sources).await?;

    println!(
        "Seeding complete: {} pages ok, {} failed, {} chunks stored ({} total in store)",
        report.pages_ok,
        report.pages_failed,
        report.chunks_stored,
        store.count().await?
    );

    Ok(())
}
