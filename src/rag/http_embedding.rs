//! OpenAI-compatible embedding endpoint (llama.cpp server, LM Studio, Ollama, ...).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::embedder::{EmbeddingModel, ModelLoader};
use super::error::RagError;
use crate::core::config::EmbeddingSettings;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

#[derive(Clone)]
pub struct HttpEmbeddingLoader {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEmbeddingLoader {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> Option<Self> {
        let base_url = settings.base_url.as_deref()?;
        let mut loader = Self::new(base_url, &settings.model);
        loader.api_key = settings.api_key.clone();
        loader.timeout = Duration::from_secs(settings.timeout_secs);
        Some(loader)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ModelLoader for HttpEmbeddingLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>, RagError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(RagError::model)?;

        let url = format!("{}/v1/models", self.base_url);
        let res = self
            .authorized(client.get(&url))
            .send()
            .await
            .map_err(RagError::model)?;

        if !res.status().is_success() {
            return Err(RagError::ModelUnavailable(format!(
                "embedding server returned {} for {}",
                res.status(),
                url
            )));
        }

        let models: ModelsResponse = res.json().await.map_err(RagError::model)?;
        // Single-model servers often report a file name rather than the alias.
        if !models.data.is_empty() && !models.data.iter().any(|m| m.id.contains(&self.model)) {
            return Err(RagError::ModelUnavailable(format!(
                "model '{}' is not served by {}",
                self.model, self.base_url
            )));
        }

        Ok(Arc::new(HttpEmbeddingModel {
            client,
            loader: self.clone(),
        }))
    }
}

pub struct HttpEmbeddingModel {
    client: Client,
    loader: HttpEmbeddingLoader,
}

#[async_trait]
impl EmbeddingModel for HttpEmbeddingModel {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/v1/embeddings", self.loader.base_url);
        let body = EmbeddingRequest {
            model: &self.loader.model,
            input: inputs,
        };

        let res = self
            .loader
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(RagError::model)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::ModelUnavailable(format!(
                "embed request failed ({}): {}",
                status, text
            )));
        }

        let payload: EmbeddingResponse = res.json().await.map_err(RagError::model)?;
        Ok(order_by_index(payload.data))
    }

    fn name(&self) -> &str {
        &self.loader.model
    }
}

fn order_by_index(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
    }
    data.into_iter().map(|d| d.embedding).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_reordered_by_index() {
        let payload: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]
        }))
        .unwrap();

        let vectors = order_by_index(payload.data);
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn loader_requires_base_url() {
        let mut settings = EmbeddingSettings::default();
        assert!(HttpEmbeddingLoader::from_settings(&settings).is_none());

        settings.base_url = Some("http://127.0.0.1:8090/".to_string());
        let loader = HttpEmbeddingLoader::from_settings(&settings).unwrap();
        assert_eq!(loader.base_url, "http://127.0.0.1:8090");
        assert_eq!(loader.model, "all-MiniLM-L6-v2");
    }

    #[tokio::test]
    #[ignore]
    async fn live_embedding_server() {
        let loader = HttpEmbeddingLoader::new("http://127.0.0.1:8090", "all-MiniLM-L6-v2");
        let model = loader.load().await.expect("embedding server should be running");
        let vectors = model
            .embed(&["Who is Max Verstappen?".to_string()])
            .await
            .expect("embed should work");
        assert_eq!(vectors.len(), 1);
    }
}
