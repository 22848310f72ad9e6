use std::env;
use std::str::FromStr;

use serde_json::Value;

use crate::rag::SimilarityMetric;

pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_STORE_PATH: &str = "f1_knowledge.db";

pub const DEFAULT_SOURCES: [&str; 11] = [
    "https://en.wikipedia.org/wiki/Formula_One",
    "https://www.formula1.com/en/latest/all",
    "https://www.formula1.com/en/racing/2024.html",
    "https://www.autosport.com/f1/",
    "https://www.motorsport.com/f1/",
    "https://www.espn.com/f1/",
    "https://www.bbc.com/sport/formula1",
    "https://www.skysports.com/f1",
    "https://en.wikipedia.org/wiki/List_of_Formula_One_drivers",
    "https://en.wikipedia.org/wiki/List_of_Formula_One_constructors",
    "https://www.fia.com/formula-1",
];

/// Typed view over the merged config value.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub environment: String,
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub store: StoreSettings,
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub path: String,
    pub metric: SimilarityMetric,
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub sources: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_chunks_per_source: usize,
    pub fetch_timeout_secs: u64,
    pub concurrency: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: port_from_env(),
            cors_allowed_origins: default_local_origins(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORE_PATH.to_string(),
            metric: SimilarityMetric::DotProduct,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            chunk_size: 512,
            chunk_overlap: 100,
            max_chunks_per_source: 500,
            fetch_timeout_secs: 30,
            concurrency: 4,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            server: ServerSettings::default(),
            embedding: EmbeddingSettings::default(),
            store: StoreSettings::default(),
            ingest: IngestSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn from_config(config: &Value) -> Self {
        let mut settings = Self::default();

        if let Some(env) = string_at(config, "app", "environment") {
            settings.environment = env;
        }

        let server = &mut settings.server;
        if let Some(host) = string_at(config, "server", "host") {
            server.host = host;
        }
        if let Some(port) = u64_at(config, "server", "port").and_then(|p| u16::try_from(p).ok()) {
            server.port = port;
        }
        let origins = string_list_at(config, "server", "cors_allowed_origins");
        if !origins.is_empty() {
            server.cors_allowed_origins = origins;
        }
        if let Some(secs) = u64_at(config, "server", "request_timeout_secs") {
            server.request_timeout_secs = secs;
        }

        let embedding = &mut settings.embedding;
        embedding.base_url = string_at(config, "embedding", "base_url");
        if let Some(model) = string_at(config, "embedding", "model") {
            embedding.model = model;
        }
        embedding.api_key = string_at(config, "embedding", "api_key");
        if let Some(secs) = u64_at(config, "embedding", "timeout_secs") {
            embedding.timeout_secs = secs;
        }

        if let Some(path) = string_at(config, "store", "path") {
            settings.store.path = path;
        }
        if let Some(raw) = string_at(config, "store", "metric") {
            match SimilarityMetric::from_str(&raw) {
                Ok(metric) => settings.store.metric = metric,
                Err(err) => tracing::warn!("{}; keeping {}", err, settings.store.metric),
            }
        }

        let ingest = &mut settings.ingest;
        let sources = string_list_at(config, "ingest", "sources");
        if !sources.is_empty() {
            ingest.sources = sources;
        }
        if let Some(v) = u64_at(config, "ingest", "chunk_size") {
            ingest.chunk_size = v as usize;
        }
        if let Some(v) = u64_at(config, "ingest", "chunk_overlap") {
            ingest.chunk_overlap = v as usize;
        }
        if let Some(v) = u64_at(config, "ingest", "max_chunks_per_source") {
            ingest.max_chunks_per_source = v as usize;
        }
        if let Some(v) = u64_at(config, "ingest", "fetch_timeout_secs") {
            ingest.fetch_timeout_secs = v;
        }
        if let Some(v) = u64_at(config, "ingest", "concurrency") {
            ingest.concurrency = (v as usize).max(1);
        }

        settings
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// RAG mode needs an embedding endpoint; without one the app serves canned answers.
    pub fn rag_configured(&self) -> bool {
        self.embedding.base_url.is_some()
    }
}

fn section<'a>(config: &'a Value, name: &str) -> Option<&'a serde_json::Map<String, Value>> {
    config.get(name).and_then(|v| v.as_object())
}

fn string_at(config: &Value, name: &str, key: &str) -> Option<String> {
    section(config, name)?
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn u64_at(config: &Value, name: &str, key: &str) -> Option<u64> {
    section(config, name)?.get(key).and_then(|v| v.as_u64())
}

fn string_list_at(config: &Value, name: &str, key: &str) -> Vec<String> {
    section(config, name)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn port_from_env() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(0)
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = AppSettings::from_config(&json!({}));

        assert!(!settings.rag_configured());
        assert!(!settings.is_development());
        assert_eq!(settings.embedding.model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(settings.store.path, DEFAULT_STORE_PATH);
        assert_eq!(settings.store.metric, SimilarityMetric::DotProduct);
        assert_eq!(settings.ingest.sources.len(), 11);
        assert_eq!(settings.ingest.chunk_size, 512);
        assert_eq!(settings.ingest.chunk_overlap, 100);
    }

    #[test]
    fn reads_configured_sections() {
        let settings = AppSettings::from_config(&json!({
            "app": {"environment": "development"},
            "server": {"host": "0.0.0.0", "port": 3001, "cors_allowed_origins": ["https://f1gpt.dev"]},
            "embedding": {"base_url": "http://127.0.0.1:8090", "api_key": "  "},
            "store": {"metric": "cosine"},
            "ingest": {"sources": ["https://www.fia.com/formula-1"], "concurrency": 0}
        }));

        assert!(settings.is_development());
        assert!(settings.rag_configured());
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.server.cors_allowed_origins, vec!["https://f1gpt.dev"]);
        assert_eq!(settings.embedding.api_key, None);
        assert_eq!(settings.store.metric, SimilarityMetric::Cosine);
        assert_eq!(settings.ingest.sources.len(), 1);
        assert_eq!(settings.ingest.concurrency, 1);
    }

    #[test]
    fn blank_base_url_means_demo_mode() {
        let settings = AppSettings::from_config(&json!({"embedding": {"base_url": ""}}));
        assert!(!settings.rag_configured());
    }
}
