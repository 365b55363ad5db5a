//! Embedding backend configuration

use serde::{Deserialize, Serialize};

/// Default timeout for HTTP backend requests
fn default_timeout() -> u64 {
    30
}

/// Default batch size for HTTP backend requests
fn default_batch_size() -> usize {
    100
}

/// Backend configuration for embedding providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    /// OpenAI-compatible HTTP endpoint
    ///
    /// Works with: OpenAI API, Azure OpenAI, LM Studio, vLLM,
    /// Ollama (OpenAI compat mode), text-embeddings-inference
    Http {
        /// API endpoint URL (e.g., "https://api.openai.com/v1/embeddings")
        endpoint: String,
        /// API key (optional, can also use OPENAI_API_KEY env var)
        #[serde(default)]
        api_key: Option<String>,
        /// Model name (e.g., "text-embedding-3-small")
        model: String,
        /// Embedding dimensions
        dimensions: usize,
        /// Request timeout in seconds
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
        /// Maximum batch size for requests
        #[serde(default = "default_batch_size")]
        max_batch_size: usize,
    },

    /// Offline feature-hashing embeddings (no model required)
    Hash {
        /// Embedding dimensions
        dimensions: usize,
    },
}

impl BackendConfig {
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Http { dimensions, .. } | Self::Hash { dimensions } => *dimensions,
        }
    }
}

/// Embedding configuration
///
/// ```toml
/// [embedding]
/// backend = "http"
/// endpoint = "http://localhost:1234/v1/embeddings"
/// model = "bge-small-en-v1.5"
/// dimensions = 384
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(flatten)]
    pub backend: BackendConfig,
    /// Number of documents embedded per call while building the vector index
    #[serde(default = "default_index_batch_size")]
    pub index_batch_size: usize,
}

fn default_index_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Hash { dimensions: 384 },
            index_batch_size: default_index_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    pub fn dimensions(&self) -> usize {
        self.backend.dimensions()
    }
}
