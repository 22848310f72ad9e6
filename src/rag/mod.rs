//! RAG (Retrieval-Augmented Generation) engine.
//!
//! This module provides:
//! - `Embedder`: lazily loaded text → vector model
//! - `Retriever`: nearest-neighbour lookup over a `VectorStore`
//! - `RelevanceFilter`: similarity threshold and confidence scoring
//! - `Synthesizer`: extractive, category-aware answer assembly
//! - `RagService`: the query orchestrator tying the stages together

mod category;
mod embedder;
mod error;
mod http_embedding;
mod relevance;
mod retriever;
mod service;
mod sqlite;
mod store;
mod synthesizer;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use category::Category;
pub use embedder::{Embedder, EmbeddingModel, ModelLoader};
pub use error::RagError;
pub use http_embedding::{HttpEmbeddingLoader, HttpEmbeddingModel};
pub use relevance::{mean_similarity, Relevance, RelevanceFilter};
pub use retriever::Retriever;
pub use service::{RagService, EMPTY_RESULT_ANSWER, LOW_CONFIDENCE_ANSWER, RETRIEVAL_LIMIT};
pub use sqlite::SqliteVectorStore;
pub use store::{NewRecord, SimilarityMetric, StoreHit, StoredRecord, VectorStore};
pub use synthesizer::{Synthesizer, NOT_RELEVANT_ANSWER};
pub use types::{
    EmbeddingVector, FilteredContext, RagResponse, RetrievedDocument, EMBEDDING_DIMENSION,
};
