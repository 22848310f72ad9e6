use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::rag::RagError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("gateway timeout")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidInput(msg) => ApiError::BadRequest(msg),
            RagError::ModelUnavailable(_) | RagError::RetrievalFailed(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            RagError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timed out".to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
