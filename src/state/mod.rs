use std::sync::Arc;

use crate::core::config::{AppPaths, AppSettings, ConfigService, EmbeddingSettings};
use crate::rag::{Embedder, HttpEmbeddingLoader, RagError, RagService, SqliteVectorStore};

pub mod error;

use error::InitializationError;

/// Shared application state for all routes.
///
/// `rag` is `None` when no embedding endpoint is configured; the chat route
/// then answers from the canned demo responses.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: AppSettings,
    pub rag: Option<Arc<RagService>>,
}

impl AppState {
    /// Loads configuration and, when an embedding endpoint is configured,
    /// opens the vector store and wires the RAG service. The embedding model
    /// itself loads on first use.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());
        let raw = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        let settings = AppSettings::from_config(&raw);

        let rag = match build_embedder(&settings.embedding) {
            Some(embedder) => {
                let store = open_store(&paths, &settings)
                    .await
                    .map_err(|e| InitializationError::Rag(e.into()))?;
                Some(Arc::new(RagService::new(embedder, store)))
            }
            None => {
                tracing::info!("embedding.base_url not set; running in demo mode");
                None
            }
        };

        Ok(Arc::new(Self::new(paths, config, settings, rag)))
    }

    pub fn new(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: AppSettings,
        rag: Option<Arc<RagService>>,
    ) -> Self {
        Self {
            paths,
            config,
            settings,
            rag,
        }
    }
}

/// Lazily loading embedder backed by the configured HTTP endpoint.
pub fn build_embedder(settings: &EmbeddingSettings) -> Option<Arc<Embedder>> {
    let loader = HttpEmbeddingLoader::from_settings(settings)?;
    Some(Arc::new(Embedder::new(Arc::new(loader))))
}

pub async fn open_store(
    paths: &AppPaths,
    settings: &AppSettings,
) -> Result<Arc<SqliteVectorStore>, RagError> {
    let db_path = paths.resolve_data_path(&settings.store.path);
    tracing::info!("Opening vector store at {}", db_path.display());
    let store = SqliteVectorStore::open(&db_path, settings.store.metric).await?;
    Ok(Arc::new(store))
}
