use serde_json::{Map, Value};

use crate::core::errors::ApiError;

const ENVIRONMENTS: [&str; 2] = ["development", "production"];
const METRICS: [&str; 2] = ["dot_product", "cosine"];

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(app) = expect_optional_object(root, "app")? {
        validate_enum_field(app, "app.environment", "environment", &ENVIRONMENTS)?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_u64_field(
            server,
            "server.request_timeout_secs",
            "request_timeout_secs",
            1,
            3_600,
        )?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_optional_string_field(embedding, "embedding.base_url", "base_url")?;
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_optional_string_field(embedding, "embedding.api_key", "api_key")?;
        validate_u64_field(embedding, "embedding.timeout_secs", "timeout_secs", 1, 3_600)?;
    }

    if let Some(store) = expect_optional_object(root, "store")? {
        validate_optional_string_field(store, "store.path", "path")?;
        validate_enum_field(store, "store.metric", "metric", &METRICS)?;
    }

    if let Some(ingest) = expect_optional_object(root, "ingest")? {
        validate_string_array_field(ingest, "ingest.sources", "sources")?;
        validate_u64_field(ingest, "ingest.chunk_size", "chunk_size", 16, 100_000)?;
        validate_u64_field(ingest, "ingest.chunk_overlap", "chunk_overlap", 0, 100_000)?;
        validate_u64_field(
            ingest,
            "ingest.max_chunks_per_source",
            "max_chunks_per_source",
            1,
            1_000_000,
        )?;
        validate_u64_field(
            ingest,
            "ingest.fetch_timeout_secs",
            "fetch_timeout_secs",
            1,
            3_600,
        )?;
        validate_u64_field(ingest, "ingest.concurrency", "concurrency", 1, 64)?;

        let size = ingest.get("chunk_size").and_then(|v| v.as_u64());
        let overlap = ingest.get("chunk_overlap").and_then(|v| v.as_u64());
        if let (Some(size), Some(overlap)) = (size, overlap) {
            if overlap >= size {
                return Err(ApiError::BadRequest(
                    "Invalid config at 'ingest.chunk_overlap': must be smaller than chunk_size"
                        .to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text.trim()) {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': expected one of {}",
            path,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
