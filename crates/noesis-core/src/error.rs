//! Structured error kinds shared across the retrieval core (spec §7).
//!
//! Each operation boundary maps whatever internal failure occurred onto one
//! of these kinds plus a human-readable message. `CacheMiss` is deliberately
//! not part of this enum — it is resolved internally by cache callers and
//! must never reach an operation boundary.

use thiserror::Error;

/// A structured error kind, stable across the tool boundary.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RecordNotFound,
    StoreError,
    EmbeddingError,
    LlmError,
    CircuitOpen,
    BulkheadRejected,
    Timeout,
}

/// The core error type. Every fallible public operation returns `Result<T, NoesisError>`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NoesisError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("circuit open: {0}")]
    CircuitOpen(String),

    #[error("bulkhead rejected: {0}")]
    BulkheadRejected(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl NoesisError {
    /// The structured error code reported to callers at the tool boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            NoesisError::Validation(_) => ErrorCode::ValidationError,
            NoesisError::NotFound(_) => ErrorCode::RecordNotFound,
            NoesisError::Store(_) => ErrorCode::StoreError,
            NoesisError::Embedding(_) => ErrorCode::EmbeddingError,
            NoesisError::Llm(_) => ErrorCode::LlmError,
            NoesisError::CircuitOpen(_) => ErrorCode::CircuitOpen,
            NoesisError::BulkheadRejected(_) => ErrorCode::BulkheadRejected,
            NoesisError::Timeout(_) => ErrorCode::Timeout,
            NoesisError::Io(_) => ErrorCode::StoreError,
            NoesisError::Serde(_) => ErrorCode::ValidationError,
        }
    }

    /// Whether this error kind is classified transient and safe to retry
    /// under the resilience envelope (spec §7 propagation policy).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NoesisError::Embedding(_) | NoesisError::Llm(_) | NoesisError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NoesisError>;
