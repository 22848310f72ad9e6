//! Storage seam for the knowledge base.
//!
//! The ingestion job writes through `insert`/`insert_batch`; the query path
//! only ever calls `query` and `find_one`. The primary implementation is
//! `SqliteVectorStore` in the `sqlite` module.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RagError;

/// Similarity metric, fixed when the store is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    DotProduct,
    Cosine,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::DotProduct => "dot_product",
            SimilarityMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot_product" | "dot" => Ok(SimilarityMetric::DotProduct),
            "cosine" => Ok(SimilarityMetric::Cosine),
            other => Err(RagError::InvalidInput(format!(
                "unknown similarity metric: {}",
                other
            ))),
        }
    }
}

/// A chunk to be written by the ingestion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub id: String,
    pub text: String,
    pub source: String,
}

/// A stored record as read back from the store.
///
/// Fields are optional because the store may hold records written by older
/// or foreign ingestion jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Option<String>,
    pub text: Option<String>,
    pub source: Option<String>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHit {
    pub record: StoredRecord,
    /// Similarity score on [0, 1] (higher = better).
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn metric(&self) -> SimilarityMetric;

    fn dimension(&self) -> usize;

    /// Insert a record with its embedding vector.
    async fn insert(&self, record: NewRecord, vector: Vec<f32>) -> Result<(), RagError>;

    /// Insert multiple records in one transaction.
    async fn insert_batch(&self, items: Vec<(NewRecord, Vec<f32>)>) -> Result<(), RagError>;

    /// Nearest neighbours of `vector`, ordered by decreasing similarity.
    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<StoreHit>, RagError>;

    /// Any one record, or `None` if the store is empty. Used by the health check.
    async fn find_one(&self) -> Result<Option<StoredRecord>, RagError>;

    async fn count(&self) -> Result<usize, RagError>;

    /// Drop every record and re-create the store with `metric`.
    async fn reset(&self, metric: SimilarityMetric) -> Result<(), RagError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parses_config_values() {
        assert_eq!(
            "dot_product".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::DotProduct
        );
        assert_eq!(
            " Cosine ".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Cosine
        );
        assert!("euclidean".parse::<SimilarityMetric>().is_err());
    }
}
