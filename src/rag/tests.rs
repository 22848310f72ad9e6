use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;

const DIM: usize = 4;

/// In-memory store returning a fixed hit list.
pub(crate) struct StaticStore {
    hits: Mutex<Vec<StoreHit>>,
    fail: bool,
    fail_queries: bool,
    queries: AtomicUsize,
    last_limit: AtomicUsize,
}

impl StaticStore {
    pub(crate) fn new(hits: Vec<StoreHit>) -> Self {
        Self {
            hits: Mutex::new(hits),
            fail: false,
            fail_queries: false,
            queries: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// Healthy for `find_one`, but every similarity query errors.
    pub(crate) fn failing_queries(hits: Vec<StoreHit>) -> Self {
        Self {
            fail_queries: true,
            ..Self::new(hits)
        }
    }

    fn hits(&self) -> Vec<StoreHit> {
        self.hits.lock().map(|h| h.clone()).unwrap_or_default()
    }

    fn check(&self) -> Result<(), RagError> {
        if self.fail {
            return Err(RagError::Storage("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for StaticStore {
    fn metric(&self) -> SimilarityMetric {
        SimilarityMetric::DotProduct
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn insert(&self, record: NewRecord, _vector: Vec<f32>) -> Result<(), RagError> {
        self.check()?;
        if let Ok(mut hits) = self.hits.lock() {
            hits.push(StoreHit {
                record: StoredRecord {
                    id: Some(record.id),
                    text: Some(record.text),
                    source: Some(record.source),
                },
                similarity: 0.0,
            });
        }
        Ok(())
    }

    async fn insert_batch(&self, items: Vec<(NewRecord, Vec<f32>)>) -> Result<(), RagError> {
        for (record, vector) in items {
            self.insert(record, vector).await?;
        }
        Ok(())
    }

    async fn query(&self, _vector: &[f32], limit: usize) -> Result<Vec<StoreHit>, RagError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        self.check()?;
        if self.fail_queries {
            return Err(RagError::Storage("query timed out".to_string()));
        }
        Ok(self.hits().into_iter().take(limit).collect())
    }

    async fn find_one(&self) -> Result<Option<StoredRecord>, RagError> {
        self.check()?;
        Ok(self.hits().into_iter().next().map(|h| h.record))
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.check()?;
        Ok(self.hits().len())
    }

    async fn reset(&self, _metric: SimilarityMetric) -> Result<(), RagError> {
        self.check()?;
        if let Ok(mut hits) = self.hits.lock() {
            hits.clear();
        }
        Ok(())
    }
}

struct UnitModel;

#[async_trait]
impl EmbeddingModel for UnitModel {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(inputs.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
    }

    fn name(&self) -> &str {
        "unit"
    }
}

/// Loader handing out a model that embeds everything onto the first axis.
pub(crate) struct UnitLoader {
    available: bool,
}

impl UnitLoader {
    pub(crate) fn available() -> Self {
        Self { available: true }
    }

    pub(crate) fn unavailable() -> Self {
        Self { available: false }
    }
}

#[async_trait]
impl ModelLoader for UnitLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError> {
        if !self.available {
            return Err(RagError::ModelUnavailable("model files missing".to_string()));
        }
        Ok(Arc::new(UnitModel))
    }
}

pub(crate) fn hit(text: &str, source: &str, similarity: f32) -> StoreHit {
    StoreHit {
        record: StoredRecord {
            id: Some(format!("{}#{}", source, similarity)),
            text: Some(text.to_string()),
            source: Some(source.to_string()),
        },
        similarity,
    }
}

pub(crate) fn service_with(store: Arc<StaticStore>) -> RagService {
    let embedder = Arc::new(Embedder::with_dimension(
        Arc::new(UnitLoader { available: true }),
        DIM,
    ));
    RagService::new(embedder, store)
}

pub(crate) const VERSTAPPEN: &str =
    "Max Verstappen is a three-time World Champion racing for Red Bull Racing.";

#[tokio::test]
async fn verstappen_scenario() {
    let store = Arc::new(StaticStore::new(vec![hit(
        VERSTAPPEN,
        "https://www.formula1.com/en/drivers/max-verstappen",
        0.85,
    )]));
    let service = service_with(store.clone());

    let response = service.answer("Who is Max Verstappen?").await.unwrap();

    assert_eq!(response.confidence, 1.0);
    assert!(response.answer.starts_with("🏎️ **F1 Driver Information:**"));
    assert!(response.answer.contains("three-time World Champion"));
    assert_eq!(
        response.sources,
        vec!["https://www.formula1.com/en/drivers/max-verstappen".to_string()]
    );
    assert_eq!(response.retrieved_docs.len(), 1);
    assert_eq!(store.last_limit.load(Ordering::SeqCst), RETRIEVAL_LIMIT);
}

#[tokio::test]
async fn empty_store_returns_empty_result() {
    let service = service_with(Arc::new(StaticStore::new(Vec::new())));

    let response = service.answer("Who won in Monaco?").await.unwrap();

    assert_eq!(response.answer, EMPTY_RESULT_ANSWER);
    assert!(response.sources.is_empty());
    assert!(response.retrieved_docs.is_empty());
    assert_eq!(response.confidence, 0.0);
}

#[tokio::test]
async fn weak_matches_return_low_confidence_answer() {
    let store = Arc::new(StaticStore::new(vec![
        hit(VERSTAPPEN, "https://www.bbc.com/sport/formula1", 0.3),
        hit(VERSTAPPEN, "https://www.espn.com/f1/", 0.12),
    ]));
    let service = service_with(store);

    let response = service.answer("Who is Max Verstappen?").await.unwrap();

    assert_eq!(response.answer, LOW_CONFIDENCE_ANSWER);
    assert_eq!(response.confidence, 0.1);
    assert_eq!(response.sources.len(), 2);
}

#[tokio::test]
async fn sources_are_capped_in_first_seen_order() {
    let origins = ["a", "b", "a", "c", "d", "e", "f", "g", "b", "c"];
    let hits: Vec<StoreHit> = origins
        .iter()
        .map(|origin| hit(VERSTAPPEN, &format!("https://{}.example", origin), 0.6))
        .collect();
    let service = service_with(Arc::new(StaticStore::new(hits)));

    let response = service.answer("Max Verstappen").await.unwrap();

    assert_eq!(
        response.sources,
        vec![
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ]
    );
    assert_eq!(response.retrieved_docs.len(), 5);
}

#[tokio::test]
async fn confidence_stays_in_unit_range() {
    for sims in [vec![1.0, 1.0, 0.99], vec![0.31], vec![0.0, 0.0], vec![0.5, 0.9, 0.2]] {
        let hits = sims
            .iter()
            .map(|s| hit(VERSTAPPEN, "https://www.fia.com/formula-1", *s))
            .collect();
        let service = service_with(Arc::new(StaticStore::new(hits)));

        let response = service.answer("Verstappen").await.unwrap();
        assert!(
            (0.0..=1.0).contains(&response.confidence),
            "confidence {} out of range for {:?}",
            response.confidence,
            sims
        );
    }
}

#[tokio::test]
async fn blank_query_is_rejected_before_io() {
    let store = Arc::new(StaticStore::new(vec![hit(VERSTAPPEN, "x", 0.9)]));
    let service = service_with(store.clone());

    let err = service.answer("   ").await.unwrap_err();

    assert!(matches!(err, RagError::InvalidInput(_)));
    assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    assert!(!service.embedder().is_loaded());
}

#[tokio::test]
async fn store_failure_propagates() {
    let service = service_with(Arc::new(StaticStore::failing()));
    let err = service.answer("Who is Max Verstappen?").await.unwrap_err();
    assert!(matches!(err, RagError::RetrievalFailed(_)));
}

#[tokio::test]
async fn model_failure_propagates() {
    let embedder = Arc::new(Embedder::with_dimension(
        Arc::new(UnitLoader { available: false }),
        DIM,
    ));
    let service = RagService::new(embedder, Arc::new(StaticStore::new(Vec::new())));

    let err = service.answer("Who is Max Verstappen?").await.unwrap_err();
    assert!(matches!(err, RagError::ModelUnavailable(_)));
    assert!(!service.health_check().await);
}

#[tokio::test]
async fn health_check_requires_records() {
    let empty = service_with(Arc::new(StaticStore::new(Vec::new())));
    assert!(!empty.health_check().await);

    let seeded = service_with(Arc::new(StaticStore::new(vec![hit(VERSTAPPEN, "x", 0.9)])));
    assert!(seeded.health_check().await);
    assert!(seeded.embedder().is_loaded());

    let broken = service_with(Arc::new(StaticStore::failing()));
    assert!(!broken.health_check().await);
}
