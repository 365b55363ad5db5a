//! Offline feature-hashing embeddings
//!
//! Each lowercase alphanumeric token is hashed with xxh3 into one of
//! `dimensions` buckets with a hash-derived sign; the bag is L2-normalized.
//! Texts sharing vocabulary land close together, which is enough for local
//! runs and tests without an embedding model. No semantic generalization.

use super::normalize;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> EmbeddingResult<Self> {
        if dimensions == 0 {
            return Err(EmbeddingError::Config(
                "hash embedder dimensions must be positive".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }
}

impl EmbeddingBackend for HashEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = xxh3_64(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        Ok(normalize(vector))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}
