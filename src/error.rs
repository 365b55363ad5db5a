//! Error types shared by retrieval, judging and evaluation

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use std::time::Duration;

/// Errors produced by reviewlens components
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller passed an argument the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A retriever's backing index is missing, unbuilt or stale
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// The judge never produced parseable output within the attempt bound
    #[error("Judge output unparseable after {attempts} attempt(s); last response: {last_response:?}")]
    JudgeUnparseable {
        attempts: usize,
        last_response: String,
    },

    /// A single generation call exceeded its deadline
    #[error("Judge timed out on attempt {attempt} after {timeout:?}")]
    JudgeTimeout { attempt: usize, timeout: Duration },

    /// Lexical (tantivy) index failure
    #[error("Lexical index error: {0}")]
    Lexical(#[from] tantivy::TantivyError),

    /// Vector (usearch) index failure
    #[error("Vector index error: {0}")]
    Vector(String),

    /// Query or document embedding failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Text generation backend failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether the error is local to one judged document.
    ///
    /// The evaluation runner records these as failed verdicts and keeps going;
    /// everything else is structural and propagates to the caller.
    pub fn is_judge_failure(&self) -> bool {
        matches!(
            self,
            Self::JudgeUnparseable { .. } | Self::JudgeTimeout { .. } | Self::Generation(_)
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn vector(err: impl std::fmt::Display) -> Self {
        Self::Vector(err.to_string())
    }
}

/// Result type for reviewlens operations
pub type Result<T> = std::result::Result<T, Error>;
