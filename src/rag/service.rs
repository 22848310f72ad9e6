use std::sync::Arc;

use super::embedder::Embedder;
use super::error::RagError;
use super::relevance::{Relevance, RelevanceFilter};
use super::retriever::Retriever;
use super::store::VectorStore;
use super::synthesizer::Synthesizer;
use super::types::{RagResponse, RetrievedDocument};

pub const RETRIEVAL_LIMIT: usize = 8;
const MAX_SOURCES: usize = 3;
const MAX_DIAGNOSTIC_DOCS: usize = 5;
const LOW_CONFIDENCE: f32 = 0.1;

pub const EMPTY_RESULT_ANSWER: &str = "I couldn't find any relevant F1 information for your query. Please try asking about F1 drivers, teams, races, or regulations.";
pub const LOW_CONFIDENCE_ANSWER: &str = "I don't have enough relevant information in my F1 database to answer that question. Could you try rephrasing or asking about a different F1 topic?";

/// Runs a question through embed → retrieve → filter → synthesize.
///
/// Cheap to share: the embedder and store handles are reference counted and
/// safe for concurrent use once the model has loaded.
#[derive(Clone)]
pub struct RagService {
    embedder: Arc<Embedder>,
    retriever: Retriever,
    filter: RelevanceFilter,
    synthesizer: Synthesizer,
}

impl RagService {
    pub fn new(embedder: Arc<Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            retriever: Retriever::new(store),
            filter: RelevanceFilter::default(),
            synthesizer: Synthesizer,
        }
    }

    pub fn embedder(&self) -> &Arc<Embedder> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        self.retriever.store()
    }

    pub async fn answer(&self, query: &str) -> Result<RagResponse, RagError> {
        tracing::info!("Processing F1 query: {:?}", query);

        let vector = self.embedder.embed(query).await?;
        let docs = self.retriever.retrieve(&vector, RETRIEVAL_LIMIT).await?;
        tracing::debug!("Retrieved {} documents", docs.len());

        if docs.is_empty() {
            tracing::info!("No documents found for query");
            return Ok(RagResponse {
                answer: EMPTY_RESULT_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                retrieved_docs: Vec::new(),
            });
        }

        let (answer, confidence) = match self.filter.filter(&docs) {
            Relevance::NoRelevantContext { confidence } => {
                tracing::info!(
                    "No document cleared the relevance threshold (overall confidence {:.2})",
                    confidence
                );
                (LOW_CONFIDENCE_ANSWER.to_string(), LOW_CONFIDENCE)
            }
            Relevance::Relevant(context) => {
                let answer = self.synthesizer.synthesize(query, &context);
                (answer, context.confidence)
            }
        };

        tracing::info!("Generated response with confidence: {:.2}", confidence);

        Ok(RagResponse {
            answer,
            sources: unique_sources(&docs),
            confidence,
            retrieved_docs: docs.into_iter().take(MAX_DIAGNOSTIC_DOCS).collect(),
        })
    }

    /// True when the embedding model loads and the store holds at least one record.
    pub async fn health_check(&self) -> bool {
        if let Err(err) = self.embedder.ensure_loaded().await {
            tracing::warn!("RAG health check failed: {}", err);
            return false;
        }

        match self.retriever.store().find_one().await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::warn!("RAG health check: knowledge base is empty");
                false
            }
            Err(err) => {
                tracing::warn!("RAG health check failed: {}", err);
                false
            }
        }
    }
}

/// Distinct origins in first-seen order, capped.
fn unique_sources(docs: &[RetrievedDocument]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::with_capacity(MAX_SOURCES);
    for doc in docs {
        if sources.len() == MAX_SOURCES {
            break;
        }
        if !sources.contains(&doc.source) {
            sources.push(doc.source.clone());
        }
    }
    sources
}
