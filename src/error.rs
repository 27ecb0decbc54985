//! Error types for the assistant and its two collaborators.
//!
//! Retrieval and generation failures are kept apart so the front end can
//! tell a broken recipe store from an unreachable language model. Neither is
//! retried here.

use thiserror::Error;

/// A single conversational turn could not be completed.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// The recipe store could not return documents for a query.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("query embedding failed: {0}")]
    Embedding(String),

    #[error("recipe store query failed: {0}")]
    Store(String),

    #[error("background task failed: {0}")]
    Task(String),
}

/// The language model could not produce a completion.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("malformed response: {0}")]
    InvalidResponse(String),

    #[error("model returned no completion")]
    EmptyCompletion,
}
