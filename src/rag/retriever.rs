use std::sync::Arc;

use super::error::RagError;
use super::store::{StoreHit, VectorStore};
use super::types::RetrievedDocument;

const UNKNOWN_SOURCE: &str = "Unknown";

/// Nearest-neighbour lookup over the vector store.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Returns up to `limit` documents ordered by descending similarity.
    ///
    /// Store errors are not retried.
    pub async fn retrieve(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, RagError> {
        if limit == 0 {
            return Err(RagError::InvalidInput(
                "retrieval limit must be positive".to_string(),
            ));
        }

        let hits = self.store.query(vector, limit).await.map_err(|err| match err {
            RagError::RetrievalFailed(_) => err,
            other => RagError::retrieval(other),
        })?;

        Ok(hits
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, hit)| to_document(index, hit))
            .collect())
    }
}

fn to_document(index: usize, hit: StoreHit) -> RetrievedDocument {
    let record = hit.record;
    RetrievedDocument {
        id: record
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("doc_{}", index)),
        text: record.text.unwrap_or_default(),
        source: record
            .source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        similarity: hit.similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::store::StoredRecord;
    use crate::rag::tests::StaticStore;

    #[tokio::test]
    async fn malformed_records_get_defaults() {
        let store = StaticStore::new(vec![
            StoreHit {
                record: StoredRecord {
                    id: Some("c1".into()),
                    text: Some("Lando Norris drives for McLaren.".into()),
                    source: Some("https://www.formula1.com".into()),
                },
                similarity: 0.9,
            },
            StoreHit {
                record: StoredRecord::default(),
                similarity: 0.4,
            },
        ]);
        let retriever = Retriever::new(Arc::new(store));

        let docs = retriever.retrieve(&[1.0], 8).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "c1");
        assert_eq!(docs[1].id, "doc_1");
        assert_eq!(docs[1].text, "");
        assert_eq!(docs[1].source, "Unknown");
        assert_eq!(docs[1].similarity, 0.4);
    }

    #[tokio::test]
    async fn zero_limit_is_invalid() {
        let retriever = Retriever::new(Arc::new(StaticStore::new(Vec::new())));
        let err = retriever.retrieve(&[1.0], 0).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn store_failure_is_retrieval_failed() {
        let retriever = Retriever::new(Arc::new(StaticStore::failing()));
        let err = retriever.retrieve(&[1.0], 8).await.unwrap_err();
        assert!(matches!(err, RagError::RetrievalFailed(_)));
    }
}
