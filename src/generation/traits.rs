//! Text generation trait definitions

use async_trait::async_trait;

/// Errors that can occur while calling a text generation backend
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Backend answered but produced no text
    #[error("Generation returned an empty response")]
    EmptyResponse,

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if provided by the API
        retry_after_ms: Option<u64>,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success status from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Prompt-in, text-out oracle used by the relevance judge.
///
/// Output is untrusted: callers must validate whatever comes back.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;

    /// Backend name (e.g., "http")
    fn name(&self) -> &str;
}
