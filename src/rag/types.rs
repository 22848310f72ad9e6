use serde::{Deserialize, Serialize};

/// Dimensionality of every vector produced by the embedder and held by the store.
pub const EMBEDDING_DIMENSION: usize = 384;

pub type EmbeddingVector = Vec<f32>;

/// A chunk returned by the retriever for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    /// Chunk text as stored by the ingestion job.
    pub text: String,
    /// Origin of the chunk, usually a URL.
    pub source: String,
    /// Store-reported closeness to the query (higher = closer).
    pub similarity: f32,
}

/// Documents that cleared the relevance threshold, plus statistics over the
/// whole retrieved set.
#[derive(Debug, Clone)]
pub struct FilteredContext {
    pub documents: Vec<RetrievedDocument>,
    /// Mean similarity over every retrieved document, not just `documents`.
    pub mean_similarity: f32,
    pub confidence: f32,
}

/// The engine's answer to a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<String>,
    pub confidence: f32,
    pub retrieved_docs: Vec<RetrievedDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_with_camel_case_keys() {
        let response = RagResponse {
            answer: "ok".to_string(),
            sources: vec!["https://www.formula1.com".to_string()],
            confidence: 0.5,
            retrieved_docs: Vec::new(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("retrievedDocs").is_some());
        assert!(value.get("retrieved_docs").is_none());
        assert_eq!(value["sources"][0], "https://www.formula1.com");
    }
}
