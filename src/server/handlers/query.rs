use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::rag::RagResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<RagResponse>, ApiError> {
    let rag = state.rag.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("RAG is not configured; running in demo mode".to_string())
    })?;

    let limit = Duration::from_secs(state.settings.server.request_timeout_secs);
    let response = tokio::time::timeout(limit, rag.answer(&request.query))
        .await
        .map_err(|_| ApiError::Timeout)??;

    Ok(Json(response))
}
