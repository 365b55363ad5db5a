//! Index and retrieval configuration

use crate::retrieval::ScoreNormalization;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Index construction and storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the lexical index and the vector index file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// HNSW M parameter (connections per layer)
    pub hnsw_m: usize,
    /// HNSW ef_construction parameter
    pub hnsw_ef_construction: usize,
    /// HNSW ef_search parameter
    pub hnsw_ef_search: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("storage")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            hnsw_m: 16,
            hnsw_ef_construction: 200,
            hnsw_ef_search: 100,
        }
    }
}

impl IndexConfig {
    pub fn lexical_dir(&self) -> PathBuf {
        self.data_dir.join("lexical")
    }

    pub fn vector_path(&self) -> PathBuf {
        self.data_dir.join("vectors.usearch")
    }
}

/// How leaf scores are mapped onto [0, 1] before fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationKind {
    MinMax,
    ReciprocalRank,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of documents retrieved (and judged) per query
    pub top_k: usize,
    /// Minimum number of candidates fetched from each leaf before fusion
    pub candidate_count: usize,
    /// Weight of the normalized lexical score in hybrid fusion
    pub weight_lexical: f32,
    /// Weight of the normalized semantic score in hybrid fusion
    pub weight_semantic: f32,
    /// Score normalization applied to each leaf list
    #[serde(default = "default_normalization")]
    pub normalization: NormalizationKind,
    /// RRF k parameter (used by reciprocal-rank normalization)
    pub rrf_k: usize,
    /// Run the two leaf retrievals on separate threads
    #[serde(default = "default_parallel_leaves")]
    pub parallel_leaves: bool,
}

fn default_normalization() -> NormalizationKind {
    NormalizationKind::MinMax
}

fn default_parallel_leaves() -> bool {
    true
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            candidate_count: 20,
            weight_lexical: 0.5,
            weight_semantic: 0.5,
            normalization: default_normalization(),
            rrf_k: 60,
            parallel_leaves: default_parallel_leaves(),
        }
    }
}

impl RetrievalConfig {
    /// Resolve the configured normalization strategy
    pub fn score_normalization(&self) -> ScoreNormalization {
        match self.normalization {
            NormalizationKind::MinMax => ScoreNormalization::MinMax,
            NormalizationKind::ReciprocalRank => ScoreNormalization::ReciprocalRank { k: self.rrf_k },
        }
    }
}
