use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::demo::{canned_response, DATABASE_NOT_READY_FOOTER, DEMO_MODE_FOOTER, FALLBACK_FOOTER};
use crate::rag::{RagError, RagResponse};
use crate::state::AppState;

pub const EMPTY_QUESTION: &str = "Please provide a question about Formula 1.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

enum Outcome {
    Answered(RagResponse),
    NotReady,
    Failed(String),
}

/// Plain-text chat endpoint. Answers from RAG when it is configured and
/// healthy, otherwise from the canned responses with a footer saying why.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let query = request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    if query.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, EMPTY_QUESTION).into_response();
    }

    tracing::info!("Received F1 query: {:?}", query);

    let Some(rag) = state.rag.as_ref() else {
        return format!("{}{}", canned_response(query), DEMO_MODE_FOOTER).into_response();
    };

    let limit = Duration::from_secs(state.settings.server.request_timeout_secs);
    let outcome = match tokio::time::timeout(limit, async {
        if !rag.health_check().await {
            return Ok::<_, RagError>(Outcome::NotReady);
        }
        rag.answer(query).await.map(Outcome::Answered)
    })
    .await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => Outcome::Failed(err.to_string()),
        Err(_) => Outcome::Failed(format!("timed out after {}s", limit.as_secs())),
    };

    let body = match outcome {
        Outcome::Answered(response) => format_answer(&response, state.settings.is_development()),
        Outcome::NotReady => {
            tracing::warn!("Vector store not ready; serving canned answer");
            format!("{}{}", canned_response(query), DATABASE_NOT_READY_FOOTER)
        }
        Outcome::Failed(reason) => {
            tracing::error!("RAG query failed, falling back: {}", reason);
            format!("{}{}", canned_response(query), FALLBACK_FOOTER)
        }
    };

    body.into_response()
}

fn format_answer(response: &RagResponse, development: bool) -> String {
    let mut text = response.answer.clone();

    if !response.sources.is_empty() {
        text.push_str("\n\n📚 **Sources:**");
        for (index, source) in response.sources.iter().enumerate() {
            text.push_str(&format!("\n{}. {}", index + 1, source_host(source)));
        }
    }

    if development {
        text.push_str(&format!(
            "\n\n🔍 *RAG Mode - Confidence: {:.1}%*",
            response.confidence * 100.0
        ));
    }

    text
}

fn source_host(source: &str) -> &str {
    let rest = source
        .strip_prefix("https://")
        .or_else(|| source.strip_prefix("http://"))
        .unwrap_or(source);
    rest.split('/').next().unwrap_or(rest)
}
