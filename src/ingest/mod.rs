//! Knowledge base seeding: fetch pages, chunk them, embed, store.

mod chunker;

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use sha2::{Digest, Sha256};

use crate::core::config::IngestSettings;
use crate::rag::{Embedder, NewRecord, RagError, VectorStore};

pub use chunker::{split_into_chunks, strip_html, ChunkerConfig, TextChunk};

const EMBED_BATCH_SIZE: usize = 32;

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub chunks_stored: usize,
}

pub struct Ingestor {
    embedder: Arc<Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: ChunkerConfig,
    concurrency: usize,
    client: reqwest::Client,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<Embedder>,
        store: Arc<dyn VectorStore>,
        settings: &IngestSettings,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .user_agent(concat!("f1gpt-seed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RagError::storage)?;

        Ok(Self {
            embedder,
            store,
            chunker: ChunkerConfig {
                chunk_size: settings.chunk_size,
                chunk_overlap: settings.chunk_overlap,
                max_chunks: settings.max_chunks_per_source,
            },
            concurrency: settings.concurrency.max(1),
            client,
        })
    }

    /// Fetches every source and stores its chunks. Pages that cannot be fetched
    /// are logged and counted; model and store failures abort the run.
    pub async fn ingest_sources(&self, sources: &[String]) -> Result<IngestReport, RagError> {
        let mut report = IngestReport::default();

        let mut pages = stream::iter(sources.iter().cloned())
            .map(|url| async move {
                let page = self.fetch_page(&url).await;
                (url, page)
            })
            .buffered(self.concurrency);

        while let Some((url, page)) = pages.next().await {
            match page {
                Ok(html) => {
                    let stored = self.ingest_text(&url, &strip_html(&html)).await?;
                    tracing::info!("Stored {} chunks from {}", stored, url);
                    report.pages_ok += 1;
                    report.chunks_stored += stored;
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", url, err);
                    report.pages_failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Chunks, embeds and stores already-cleaned text. Returns the chunk count.
    pub async fn ingest_text(&self, source: &str, text: &str) -> Result<usize, RagError> {
        let chunks = split_into_chunks(text, source, &self.chunker);
        let mut stored = 0;

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            let items = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| {
                    let record = NewRecord {
                        id: chunk_id(&chunk.source, chunk.chunk_index),
                        text: chunk.text.clone(),
                        source: chunk.source.clone(),
                    };
                    (record, vector)
                })
                .collect::<Vec<_>>();

            stored += items.len();
            self.store.insert_batch(items).await?;
        }

        Ok(stored)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Stable record id: hex sha256 of the source followed by the chunk index.
pub fn chunk_id(source: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(chunk_index.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::tests::{StaticStore, UnitLoader};

    fn settings(chunk_size: usize) -> IngestSettings {
        IngestSettings {
            chunk_size,
            chunk_overlap: 10,
            ..IngestSettings::default()
        }
    }

    fn ingestor(store: Arc<StaticStore>, chunk_size: usize) -> Ingestor {
        let embedder = Arc::new(Embedder::with_dimension(Arc::new(UnitLoader::available()), 4));
        Ingestor::new(embedder, store, &settings(chunk_size)).unwrap()
    }

    #[test]
    fn chunk_ids_are_stable_and_distinct() {
        let a = chunk_id("https://www.fia.com/formula-1", 0);
        assert_eq!(a, chunk_id("https://www.fia.com/formula-1", 0));
        assert_ne!(a, chunk_id("https://www.fia.com/formula-1", 1));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn ingest_text_stores_every_chunk() {
        let store = Arc::new(StaticStore::new(Vec::new()));
        let ingestor = ingestor(store.clone(), 64);
        let text = "Lewis Hamilton won at Silverstone. ".repeat(12);

        let stored = ingestor.ingest_text("https://www.bbc.com/sport/formula1", &text).await.unwrap();

        assert!(stored > 1);
        assert_eq!(store.count().await.unwrap(), stored);
    }

    #[tokio::test]
    async fn unreachable_sources_are_skipped() {
        let store = Arc::new(StaticStore::new(Vec::new()));
        let ingestor = ingestor(store.clone(), 64);

        let report = ingestor
            .ingest_sources(&["http://127.0.0.1:1/unreachable".to_string()])
            .await
            .unwrap();

        assert_eq!(
            report,
            IngestReport {
                pages_ok: 0,
                pages_failed: 1,
                chunks_stored: 0,
            }
        );
    }

    #[tokio::test]
    async fn store_failures_abort_ingestion() {
        let ingestor = ingestor(Arc::new(StaticStore::failing()), 64);
        let err = ingestor
            .ingest_text("x", "Monza is the Temple of Speed in Italy.")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Storage(_)));
    }
}
