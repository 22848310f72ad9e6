//! Query and chunk embedding.
//!
//! The underlying model is loaded on first use and shared by every caller
//! afterwards. Concurrent first callers wait on the same load.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::error::RagError;
use super::types::{EmbeddingVector, EMBEDDING_DIMENSION};
use crate::vector_math::l2_normalize;

/// A loaded text-embedding model.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of texts, one vector per input in the same order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    fn name(&self) -> &str;
}

/// Performs the one-time load of an embedding model.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError>;
}

pub struct Embedder {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn EmbeddingModel>>,
    dimension: usize,
}

impl Embedder {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self::with_dimension(loader, EMBEDDING_DIMENSION)
    }

    pub fn with_dimension(loader: Arc<dyn ModelLoader>, dimension: usize) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Loads the model if this is the first use.
    ///
    /// A failed load leaves the cell empty so a later call can try again.
    pub async fn ensure_loaded(&self) -> Result<&Arc<dyn EmbeddingModel>, RagError> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!("Loading embedding model...");
                let model = self.loader.load().await?;
                tracing::info!("Embedding model '{}' loaded", model.name());
                Ok::<_, RagError>(model)
            })
            .await
    }

    pub async fn embed(&self, text: &str) -> Result<EmbeddingVector, RagError> {
        if text.trim().is_empty() {
            return Err(RagError::InvalidInput(
                "text to embed must not be empty".to_string(),
            ));
        }

        let mut vectors = self.embed_checked(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::ModelUnavailable("model returned no embedding".to_string()))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(pos) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(RagError::InvalidInput(format!(
                "text to embed at position {} is empty",
                pos
            )));
        }

        self.embed_checked(texts).await
    }

    async fn embed_checked(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, RagError> {
        let model = self.ensure_loaded().await?;
        let mut vectors = model.embed(texts).await?;

        if vectors.len() != texts.len() {
            return Err(RagError::ModelUnavailable(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        for vector in vectors.iter_mut() {
            if vector.len() != self.dimension {
                return Err(RagError::ModelUnavailable(format!(
                    "embedding dimension mismatch: {} != {}",
                    vector.len(),
                    self.dimension
                )));
            }
            l2_normalize(vector);
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::vector_math::l2_norm;

    struct ConstantModel {
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingModel for ConstantModel {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(inputs.iter().map(|_| vec![2.0; self.dimension]).collect())
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
        dimension: usize,
        fail: bool,
    }

    impl CountingLoader {
        fn new(dimension: usize) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                dimension,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(RagError::ModelUnavailable("missing model artifacts".into()));
            }
            Ok(Arc::new(ConstantModel {
                dimension: self.dimension,
            }))
        }
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_loading() {
        let loader = Arc::new(CountingLoader::new(4));
        let embedder = Embedder::with_dimension(loader.clone(), 4);

        let err = embedder.embed("   \n").await.unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
        assert!(!embedder.is_loaded());
    }

    #[tokio::test]
    async fn embeddings_are_unit_length() {
        let embedder = Embedder::with_dimension(Arc::new(CountingLoader::new(4)), 4);
        let vector = embedder.embed("Who is Max Verstappen?").await.unwrap();

        assert_eq!(vector.len(), 4);
        assert!((l2_norm(&vector) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn concurrent_first_use_loads_once() {
        let loader = Arc::new(CountingLoader::new(4));
        let embedder = Arc::new(Embedder::with_dimension(loader.clone(), 4));

        let mut handles = Vec::new();
        for i in 0..8 {
            let embedder = embedder.clone();
            handles.push(tokio::spawn(async move {
                embedder.embed(&format!("query {}", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_failure_propagates() {
        let loader = Arc::new(CountingLoader {
            fail: true,
            ..CountingLoader::new(4)
        });
        let embedder = Embedder::with_dimension(loader.clone(), 4);

        let err = embedder.embed("Monaco").await.unwrap_err();
        assert!(matches!(err, RagError::ModelUnavailable(_)));
        assert!(!embedder.is_loaded());

        // next call retries the load
        let _ = embedder.embed("Monaco").await;
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn wrong_dimension_is_model_failure() {
        let embedder = Embedder::with_dimension(Arc::new(CountingLoader::new(3)), 4);
        let err = embedder.embed("Silverstone").await.unwrap_err();
        assert!(matches!(err, RagError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn batch_rejects_blank_entries() {
        let embedder = Embedder::with_dimension(Arc::new(CountingLoader::new(4)), 4);
        let err = embedder
            .embed_batch(&["Spa".to_string(), " ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
    }
}
