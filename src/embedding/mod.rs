//! Pluggable embedding backends
//!
//! - **HTTP backend**: OpenAI-compatible APIs (OpenAI, Azure, LM Studio, vLLM, etc.)
//! - **Hash backend**: offline feature hashing, no model required
//!
//! # Example Configuration
//!
//! ```toml
//! # Local LM Studio / vLLM
//! [embedding]
//! backend = "http"
//! endpoint = "http://localhost:1234/v1/embeddings"
//! model = "bge-small-en-v1.5"
//! dimensions = 384
//!
//! # Offline
//! [embedding]
//! backend = "hash"
//! dimensions = 384
//! ```

mod hash;
mod http;
mod traits;

pub use hash::HashEmbedder;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
pub use traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};

use crate::config::BackendConfig;
use crate::types::Embedding;
use std::sync::Arc;
use tracing::info;

/// Create an embedding backend from configuration
pub fn create_backend(config: &BackendConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    match config {
        BackendConfig::Http {
            endpoint,
            api_key,
            model,
            dimensions,
            timeout_secs,
            max_batch_size,
        } => {
            let backend = HttpEmbedder::new(HttpEmbedderConfig {
                endpoint: endpoint.clone(),
                api_key: api_key.clone(),
                model: model.clone(),
                dimensions: *dimensions,
                timeout_secs: *timeout_secs,
                max_batch_size: *max_batch_size,
            })?;
            Ok(Arc::new(backend))
        }
        BackendConfig::Hash { dimensions } => {
            info!("Using offline hash embeddings ({} dimensions)", dimensions);
            Ok(Arc::new(HashEmbedder::new(*dimensions)?))
        }
    }
}

/// Normalize an embedding vector to unit length
pub(crate) fn normalize(mut embedding: Embedding) -> Embedding {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.iter_mut().for_each(|x| *x /= norm);
    }
    embedding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scales_to_unit_length() {
        let normalized = normalize(vec![3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector() {
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn creates_backends_from_config() {
        let hash = create_backend(&BackendConfig::Hash { dimensions: 32 }).unwrap();
        assert_eq!(hash.name(), "hash");
        assert_eq!(hash.dimensions(), 32);

        let http = create_backend(&BackendConfig::Http {
            endpoint: "http://localhost:8080/v1/embeddings".to_string(),
            api_key: None,
            model: "test-model".to_string(),
            dimensions: 384,
            timeout_secs: 30,
            max_batch_size: 100,
        })
        .unwrap();
        assert_eq!(http.name(), "http");
        assert_eq!(http.dimensions(), 384);
    }
}
