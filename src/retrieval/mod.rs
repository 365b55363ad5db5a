//! Retrieval over the review corpus
//!
//! Combines:
//! - BM25 lexical search (Tantivy)
//! - Dense vector search (HNSW)
//! - Weighted fusion of the normalized scores of both

mod fusion;
mod hybrid;
mod lexical;
mod semantic;

pub use fusion::*;
pub use hybrid::*;
pub use lexical::*;
pub use semantic::*;

use crate::config::RetrievalConfig;
use crate::corpus::Corpus;
use crate::embedding::EmbeddingBackend;
use crate::error::Result;
use crate::index::IndexSet;
use crate::types::{Document, RetrievalMode};
use std::sync::Arc;

/// One retrieved document with the score its mode ranked it by
#[derive(Debug, Clone)]
pub struct RankedDocument {
    pub document: Arc<Document>,
    /// Raw BM25 score, cosine similarity, or fused score depending on mode
    pub score: f32,
}

/// The three retrievers an evaluation pass can choose between
pub struct Retrievers {
    pub lexical: Arc<LexicalRetriever>,
    pub semantic: Arc<SemanticRetriever>,
    pub hybrid: HybridRetriever,
    weights: FusionWeights,
}

impl Retrievers {
    /// Wire up all three retrievers over one corpus and its indexes.
    ///
    /// Fails with `InvalidArgument` if the configured fusion weights are invalid.
    pub fn new(
        corpus: Arc<Corpus>,
        indexes: &IndexSet,
        embedder: Arc<dyn EmbeddingBackend>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        let weights = FusionWeights::new(config.weight_lexical, config.weight_semantic)?;
        let lexical = Arc::new(LexicalRetriever::new(indexes.lexical.clone(), corpus.clone()));
        let semantic = Arc::new(SemanticRetriever::new(indexes.vector.clone(), embedder, corpus));
        let hybrid = HybridRetriever::new(lexical.clone(), semantic.clone(), config);
        Ok(Self {
            lexical,
            semantic,
            hybrid,
            weights,
        })
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Top `k` documents for `query` under `mode`, best first
    pub fn retrieve(&self, mode: RetrievalMode, query: &str, k: usize) -> Result<Vec<RankedDocument>> {
        let ranked = match mode {
            RetrievalMode::Lexical => self
                .lexical
                .retrieve(query, k)?
                .into_iter()
                .map(|c| RankedDocument {
                    document: c.document,
                    score: c.score,
                })
                .collect(),
            RetrievalMode::Semantic => self
                .semantic
                .retrieve(query, k)?
                .into_iter()
                .map(|c| RankedDocument {
                    document: c.document,
                    score: c.score,
                })
                .collect(),
            RetrievalMode::Hybrid => self
                .hybrid
                .retrieve(query, k, self.weights.lexical, self.weights.semantic)?
                .into_iter()
                .map(|c| RankedDocument {
                    document: c.document,
                    score: c.fused_score,
                })
                .collect(),
        };
        Ok(ranked)
    }
}
