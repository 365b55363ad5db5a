//! Hybrid retrieval combining lexical and semantic search

use super::fusion::{fuse, FusionWeights, ScoreNormalization};
use super::lexical::LexicalRetriever;
use super::semantic::SemanticRetriever;
use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::types::{FusedCandidate, ScoredCandidate};
use crate::util::truncate_str;
use std::sync::Arc;
use tracing::debug;

/// Fuses the two leaf retrievers into one ranking
pub struct HybridRetriever {
    lexical: Arc<LexicalRetriever>,
    semantic: Arc<SemanticRetriever>,
    /// Minimum number of candidates requested from each leaf
    candidate_count: usize,
    normalization: ScoreNormalization,
    /// Query both leaves concurrently
    parallel_leaves: bool,
}

impl HybridRetriever {
    pub fn new(lexical: Arc<LexicalRetriever>, semantic: Arc<SemanticRetriever>, config: &RetrievalConfig) -> Self {
        Self {
            lexical,
            semantic,
            candidate_count: config.candidate_count,
            normalization: config.score_normalization(),
            parallel_leaves: config.parallel_leaves,
        }
    }

    /// Top `k` documents by weighted normalized score.
    ///
    /// A leaf whose weight is exactly zero is not queried, so weights of
    /// (1, 0) or (0, 1) reproduce the corresponding leaf ranking. With both
    /// weights zero every candidate fuses to 0 and the ranking is by row.
    pub fn retrieve(
        &self,
        query: &str,
        k: usize,
        weight_lexical: f32,
        weight_semantic: f32,
    ) -> Result<Vec<FusedCandidate>> {
        let weights = FusionWeights::new(weight_lexical, weight_semantic)?;
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Over-fetch so fusion can promote documents outside either leaf's top k
        let fetch = k.max(self.candidate_count);
        let (lexical, semantic) = self.retrieve_leaves(query, fetch, weights)?;

        let fused = fuse(&lexical, &semantic, weights, self.normalization, k);
        debug!(
            "Hybrid search for '{}': {} lexical + {} semantic candidates fused to {}",
            truncate_str(query, 60),
            lexical.len(),
            semantic.len(),
            fused.len()
        );
        Ok(fused)
    }

    fn retrieve_leaves(
        &self,
        query: &str,
        fetch: usize,
        weights: FusionWeights,
    ) -> Result<(Vec<ScoredCandidate>, Vec<ScoredCandidate>)> {
        // All-zero weights still rank the union of both candidate lists
        let query_all = weights.is_zero();
        let want_lexical = query_all || weights.lexical > 0.0;
        let want_semantic = query_all || weights.semantic > 0.0;

        if self.parallel_leaves && want_lexical && want_semantic {
            return std::thread::scope(|s| {
                let lexical = s.spawn(|| self.lexical.retrieve(query, fetch));
                let semantic = self.semantic.retrieve(query, fetch);
                let lexical = lexical
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                Ok((lexical?, semantic?))
            });
        }

        let lexical = if want_lexical {
            self.lexical.retrieve(query, fetch)?
        } else {
            Vec::new()
        };
        let semantic = if want_semantic {
            self.semantic.retrieve(query, fetch)?
        } else {
            Vec::new()
        };
        Ok((lexical, semantic))
    }
}
