//! SQLite-backed vector store.
//!
//! In-process store using SQLite for chunk text and serialized embeddings,
//! with brute-force similarity for search. The metric and dimension are
//! recorded in `rag_meta` when the store is first created.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use super::error::RagError;
use super::store::{NewRecord, SimilarityMetric, StoreHit, StoredRecord, VectorStore};
use super::types::EMBEDDING_DIMENSION;
use crate::vector_math::{cosine_similarity, dot};

pub struct SqliteVectorStore {
    pool: SqlitePool,
    db_path: PathBuf,
    metric: RwLock<SimilarityMetric>,
    dimension: usize,
}

impl SqliteVectorStore {
    pub async fn open(db_path: &Path, metric: SimilarityMetric) -> Result<Self, RagError> {
        Self::open_with_dimension(db_path, metric, EMBEDDING_DIMENSION).await
    }

    pub async fn open_with_dimension(
        db_path: &Path,
        metric: SimilarityMetric,
        dimension: usize,
    ) -> Result<Self, RagError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RagError::Storage(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(RagError::storage)?;

        let store = Self {
            pool,
            db_path: db_path.to_path_buf(),
            metric: RwLock::new(metric),
            dimension,
        };
        store.init_schema().await?;
        store.load_or_record_meta(metric).await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT,
                source TEXT,
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::storage)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::storage)?;

        Ok(())
    }

    async fn load_or_record_meta(&self, requested: SimilarityMetric) -> Result<(), RagError> {
        if let Some(stored) = self.read_meta("dimension").await? {
            let stored_dim: usize = stored.parse().map_err(RagError::storage)?;
            if stored_dim != self.dimension {
                return Err(RagError::Storage(format!(
                    "store at {} holds {}-dimension vectors, expected {}",
                    self.db_path.display(),
                    stored_dim,
                    self.dimension
                )));
            }
        }

        match self.read_meta("metric").await? {
            Some(stored) => {
                let stored: SimilarityMetric = stored.parse()?;
                if stored != requested {
                    tracing::warn!(
                        "Store was created with metric {}; ignoring requested {}",
                        stored,
                        requested
                    );
                }
                self.set_metric(stored);
            }
            None => self.write_meta(requested).await?,
        }

        Ok(())
    }

    async fn read_meta(&self, key: &str) -> Result<Option<String>, RagError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM rag_meta WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(RagError::storage)
    }

    async fn write_meta(&self, metric: SimilarityMetric) -> Result<(), RagError> {
        for (key, value) in [
            ("metric", metric.as_str().to_string()),
            ("dimension", self.dimension.to_string()),
        ] {
            sqlx::query(
                "INSERT OR REPLACE INTO rag_meta (key, value, updated_at)
                 VALUES (?1, ?2, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            )
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(RagError::storage)?;
        }
        self.set_metric(metric);
        Ok(())
    }

    fn set_metric(&self, metric: SimilarityMetric) {
        match self.metric.write() {
            Ok(mut guard) => *guard = metric,
            Err(poisoned) => *poisoned.into_inner() = metric,
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), RagError> {
        if vector.len() != self.dimension {
            return Err(RagError::InvalidInput(format!(
                "vector length mismatch: {} != {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Raw dot/cosine score rescaled onto [0, 1].
    fn score(metric: SimilarityMetric, query: &[f32], stored: &[f32]) -> f32 {
        let raw = match metric {
            SimilarityMetric::DotProduct => dot(query, stored),
            SimilarityMetric::Cosine => cosine_similarity(query, stored),
        };
        ((1.0 + raw) / 2.0).clamp(0.0, 1.0)
    }

    fn row_to_record(row: &SqliteRow) -> StoredRecord {
        StoredRecord {
            id: row.try_get::<Option<String>, _>("chunk_id").unwrap_or(None),
            text: row.try_get::<Option<String>, _>("content").unwrap_or(None),
            source: row.try_get::<Option<String>, _>("source").unwrap_or(None),
        }
    }

    async fn insert_one<'e, E>(executor: E, record: &NewRecord, vector: &[f32]) -> Result<(), RagError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT OR REPLACE INTO rag_chunks (chunk_id, content, source, embedding)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.id)
        .bind(&record.text)
        .bind(&record.source)
        .bind(Self::serialize_embedding(vector))
        .execute(executor)
        .await
        .map_err(RagError::storage)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn metric(&self) -> SimilarityMetric {
        match self.metric.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn insert(&self, record: NewRecord, vector: Vec<f32>) -> Result<(), RagError> {
        self.check_dimension(&vector)?;
        Self::insert_one(&self.pool, &record, &vector).await
    }

    async fn insert_batch(&self, items: Vec<(NewRecord, Vec<f32>)>) -> Result<(), RagError> {
        if items.is_empty() {
            return Ok(());
        }
        for (_, vector) in &items {
            self.check_dimension(vector)?;
        }

        let mut tx = self.pool.begin().await.map_err(RagError::storage)?;
        for (record, vector) in &items {
            Self::insert_one(&mut *tx, record, vector).await?;
        }
        tx.commit().await.map_err(RagError::storage)?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<StoreHit>, RagError> {
        if vector.len() != self.dimension {
            return Err(RagError::RetrievalFailed(format!(
                "query vector length mismatch: {} != {}",
                vector.len(),
                self.dimension
            )));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT chunk_id, content, source, embedding FROM rag_chunks")
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::retrieval)?;

        let metric = self.metric();
        let mut hits: Vec<StoreHit> = rows
            .iter()
            .filter_map(|row| {
                let bytes: Vec<u8> = row
                    .try_get::<Option<Vec<u8>>, _>("embedding")
                    .ok()
                    .flatten()?;
                let stored = Self::deserialize_embedding(&bytes);
                if stored.len() != self.dimension {
                    return None;
                }

                Some(StoreHit {
                    record: Self::row_to_record(row),
                    similarity: Self::score(metric, vector, &stored),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        Ok(hits)
    }

    async fn find_one(&self) -> Result<Option<StoredRecord>, RagError> {
        let row = sqlx::query("SELECT chunk_id, content, source FROM rag_chunks LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(RagError::retrieval)?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    async fn count(&self) -> Result<usize, RagError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(RagError::retrieval)?;

        Ok(count as usize)
    }

    async fn reset(&self, metric: SimilarityMetric) -> Result<(), RagError> {
        sqlx::query("DELETE FROM rag_chunks")
            .execute(&self.pool)
            .await
            .map_err(RagError::storage)?;

        self.write_meta(metric).await
    }
}
