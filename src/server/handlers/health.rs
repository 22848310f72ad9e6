use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "rag_configured": state.rag.is_some()
    }))
}

/// Embedding model loads and the store holds at least one record.
pub async fn rag_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = match &state.rag {
        Some(rag) => rag.health_check().await,
        None => false,
    };
    Json(json!({ "healthy": healthy }))
}
