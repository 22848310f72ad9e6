use thiserror::Error;

/// Failures surfaced by the retrieval-and-synthesis engine.
///
/// A weak match is a low-confidence answer, not an error.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("retrieval failed: {0}")]
    RetrievalFailed(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl RagError {
    pub fn model<E: std::fmt::Display>(err: E) -> Self {
        RagError::ModelUnavailable(err.to_string())
    }

    pub fn retrieval<E: std::fmt::Display>(err: E) -> Self {
        RagError::RetrievalFailed(err.to_string())
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        RagError::Storage(err.to_string())
    }
}
