use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health, query};
use crate::state::AppState;

/// Creates the application router.
///
/// Routes:
/// - `GET /health`, `GET /api/rag/health`
/// - `POST /api/rag/query` (JSON in, JSON out)
/// - `POST /api/chat` (chat messages in, plain text out)
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    Router::new()
        .route("/health", get(health::health))
        .route("/api/rag/health", get(health::rag_health))
        .route("/api/rag/query", post(query::query))
        .route("/api/chat", post(chat::chat))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}
