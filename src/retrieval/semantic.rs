//! Embedding-similarity leaf retriever

use crate::corpus::Corpus;
use crate::embedding::EmbeddingBackend;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::types::{RetrievalSource, ScoredCandidate};
use std::sync::Arc;
use tracing::debug;

/// Ranks documents by cosine similarity between query and document embeddings.
///
/// Only the query is embedded here; document vectors come from the index.
pub struct SemanticRetriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingBackend>,
    corpus: Arc<Corpus>,
}

impl SemanticRetriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingBackend>, corpus: Arc<Corpus>) -> Self {
        Self {
            index,
            embedder,
            corpus,
        }
    }

    /// At most `k` candidates, highest similarity (1 - cosine distance) first,
    /// ties by ascending row
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredCandidate>> {
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query)?;
        let mut candidates = self
            .index
            .nearest(&embedding, k)?
            .into_iter()
            .map(|hit| {
                Ok(ScoredCandidate {
                    document: self.corpus.resolve(hit.row)?,
                    score: 1.0 - hit.distance,
                    source: RetrievalSource::Semantic,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Distances that differ below f32 resolution collapse to equal
        // similarities; re-sort so those ties still break by row.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.row().cmp(&b.row())));

        debug!("Semantic retrieval: {} candidates", candidates.len());
        Ok(candidates)
    }
}
