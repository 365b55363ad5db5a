//! Score fusion for combining the lexical and semantic candidate lists
//!
//! Raw BM25 scores and cosine similarities live on unrelated scales, so each
//! list is first normalized to [0, 1] over its own candidates and only then
//! combined as a weighted sum.

use crate::error::{Error, Result};
use crate::types::{Document, DocumentId, FusedCandidate, ScoredCandidate};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-list score normalization applied before fusion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScoreNormalization {
    #[default]
    /// `(score - min) / (max - min)`; a list whose scores are all equal maps to 1.0
    MinMax,
    /// Rank-based `(k + 1) / (k + rank)`, so the first candidate maps to 1.0.
    /// Ignores score magnitudes entirely.
    ReciprocalRank { k: usize },
}

impl ScoreNormalization {
    /// Normalized scores for `candidates`, index-aligned with the input.
    ///
    /// The input must already be ordered best first.
    pub fn normalize(&self, candidates: &[ScoredCandidate]) -> Vec<f32> {
        match *self {
            Self::MinMax => {
                let max_score = candidates.iter().map(|c| c.score).fold(f32::MIN, f32::max);
                let min_score = candidates.iter().map(|c| c.score).fold(f32::MAX, f32::min);
                let range = max_score - min_score;

                candidates
                    .iter()
                    .map(|c| {
                        if range > 0.0 && range.is_finite() {
                            ((c.score - min_score) / range).clamp(0.0, 1.0)
                        } else {
                            1.0
                        }
                    })
                    .collect()
            }
            Self::ReciprocalRank { k } => (1..=candidates.len())
                .map(|rank| (k as f32 + 1.0) / (k as f32 + rank as f32))
                .collect(),
        }
    }
}

/// Caller-supplied weights for the two signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl FusionWeights {
    /// Weights need not sum to 1, but must be finite and non-negative
    pub fn new(lexical: f32, semantic: f32) -> Result<Self> {
        for (name, weight) in [("lexical", lexical), ("semantic", semantic)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::invalid(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(Self { lexical, semantic })
    }

    pub fn is_zero(&self) -> bool {
        self.lexical == 0.0 && self.semantic == 0.0
    }
}

#[derive(Default)]
struct Contributions {
    document: Option<Arc<Document>>,
    lexical: Option<f32>,
    semantic: Option<f32>,
}

/// Fuse two best-first candidate lists into the top `k` by weighted
/// normalized score.
///
/// A document missing from one list scores 0 on that list. Equal fused
/// scores break by ascending row, so the output is fully deterministic.
pub fn fuse(
    lexical: &[ScoredCandidate],
    semantic: &[ScoredCandidate],
    weights: FusionWeights,
    normalization: ScoreNormalization,
    k: usize,
) -> Vec<FusedCandidate> {
    let mut by_row: BTreeMap<DocumentId, Contributions> = BTreeMap::new();

    for (candidate, score) in lexical.iter().zip(normalization.normalize(lexical)) {
        let entry = by_row.entry(candidate.row()).or_default();
        entry.document.get_or_insert_with(|| candidate.document.clone());
        // Leaf lists are duplicate-free; keep the best score if one slips through
        entry.lexical = Some(entry.lexical.map_or(score, |s| s.max(score)));
    }
    for (candidate, score) in semantic.iter().zip(normalization.normalize(semantic)) {
        let entry = by_row.entry(candidate.row()).or_default();
        entry.document.get_or_insert_with(|| candidate.document.clone());
        entry.semantic = Some(entry.semantic.map_or(score, |s| s.max(score)));
    }

    let mut fused: Vec<FusedCandidate> = by_row
        .into_values()
        .filter_map(|c| {
            let document = c.document?;
            let fused_score = weights.lexical * c.lexical.unwrap_or(0.0)
                + weights.semantic * c.semantic.unwrap_or(0.0);
            Some(FusedCandidate {
                document,
                fused_score,
                rank: 0,
                lexical_score: c.lexical,
                semantic_score: c.semantic,
            })
        })
        .collect();

    fused.sort_by(|a, b| {
        b.fused_score
            .total_cmp(&a.fused_score)
            .then(a.row().cmp(&b.row()))
    });
    fused.truncate(k);
    for (i, candidate) in fused.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    fused
}
