//! Core types for reviewlens

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Stable identifier for a document: its 0-based position in the corpus
pub type DocumentId = usize;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Lowest relevance score a verdict may carry
pub const MIN_VERDICT_SCORE: u8 = 1;

/// Highest relevance score a verdict may carry
pub const MAX_VERDICT_SCORE: u8 = 10;

// ============================================================================
// Corpus records
// ============================================================================

/// Immutable corpus record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub row: DocumentId,
    pub text: String,
}

impl Document {
    pub fn new(row: DocumentId, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
        }
    }
}

// ============================================================================
// Retrieval candidates
// ============================================================================

/// Which leaf retriever produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
    Lexical,
    Semantic,
}

impl fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

/// A document scored by a single leaf retriever
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub document: Arc<Document>,
    pub score: f32,
    pub source: RetrievalSource,
}

impl ScoredCandidate {
    pub fn row(&self) -> DocumentId {
        self.document.row
    }
}

/// A document ranked by the hybrid retriever
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub document: Arc<Document>,
    pub fused_score: f32,
    /// 1-based position in the fused ranking
    pub rank: usize,
    /// Normalized lexical score, if the lexical retriever returned the document
    pub lexical_score: Option<f32>,
    /// Normalized semantic score, if the semantic retriever returned the document
    pub semantic_score: Option<f32>,
}

impl FusedCandidate {
    pub fn row(&self) -> DocumentId {
        self.document.row
    }

    /// Sources that contributed to this candidate
    pub fn matched_by(&self) -> Vec<RetrievalSource> {
        let mut sources = Vec::with_capacity(2);
        if self.lexical_score.is_some() {
            sources.push(RetrievalSource::Lexical);
        }
        if self.semantic_score.is_some() {
            sources.push(RetrievalSource::Semantic);
        }
        sources
    }
}

/// Retrieval strategy used for one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    Lexical,
    Semantic,
    Hybrid,
}

impl RetrievalMode {
    /// Every mode, in reporting order
    pub const ALL: [RetrievalMode; 3] = [Self::Lexical, Self::Semantic, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(Self::Lexical),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown retrieval mode '{}'", other)),
        }
    }
}

// ============================================================================
// Judge verdicts
// ============================================================================

/// Validated relevance judgment for one (query, document) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVerdict")]
pub struct Verdict {
    score: u8,
    reasoning: String,
}

#[derive(Deserialize)]
struct RawVerdict {
    score: i64,
    reasoning: String,
}

impl TryFrom<RawVerdict> for Verdict {
    type Error = String;

    fn try_from(raw: RawVerdict) -> Result<Self, Self::Error> {
        Verdict::new(raw.score, raw.reasoning)
    }
}

impl Verdict {
    /// Create a verdict, rejecting scores outside 1..=10
    pub fn new(score: i64, reasoning: impl Into<String>) -> Result<Self, String> {
        if score < MIN_VERDICT_SCORE as i64 || score > MAX_VERDICT_SCORE as i64 {
            return Err(format!(
                "score {} is outside the range {}..={}",
                score, MIN_VERDICT_SCORE, MAX_VERDICT_SCORE
            ));
        }
        Ok(Self {
            score: score as u8,
            reasoning: reasoning.into(),
        })
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

/// Why the judge produced no verdict for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The oracle never produced parseable output within the attempt bound
    Unparseable,
    /// A generation call exceeded its deadline
    Timeout,
    /// The generation backend itself failed (transport, API error)
    Generation,
}

/// Sentinel recorded in place of a verdict when judging fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeFailure {
    pub kind: FailureKind,
    pub detail: String,
}

/// Outcome of judging one retrieved document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    Judged(Verdict),
    Failed(JudgeFailure),
}

impl Assessment {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Judged(verdict) => Some(verdict),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

// ============================================================================
// Evaluation records
// ============================================================================

/// One retrieved document together with its assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub row: DocumentId,
    pub text: String,
    pub evaluation: Assessment,
}

/// Judged retrieval output for one query under one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub mode: RetrievalMode,
    /// True when a judge failure stopped evaluation of the remaining documents
    #[serde(default)]
    pub aborted: bool,
    pub retrieved_documents: Vec<RetrievedDocument>,
}

impl QueryResult {
    pub fn new(query: impl Into<String>, mode: RetrievalMode) -> Self {
        Self {
            query: query.into(),
            mode,
            aborted: false,
            retrieved_documents: Vec::new(),
        }
    }

    /// Verdicts of all successfully judged documents, in retrieval order
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.retrieved_documents
            .iter()
            .filter_map(|d| d.evaluation.verdict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_rejects_out_of_range_scores() {
        assert!(Verdict::new(0, "too low").is_err());
        assert!(Verdict::new(11, "too high").is_err());
        assert!(Verdict::new(-3, "negative").is_err());
        assert_eq!(Verdict::new(1, "ok").unwrap().score(), 1);
        assert_eq!(Verdict::new(10, "ok").unwrap().score(), 10);
    }

    #[test]
    fn verdict_deserialization_validates_range() {
        let ok: Verdict = serde_json::from_str(r#"{"score": 7, "reasoning": "fine"}"#).unwrap();
        assert_eq!(ok.score(), 7);
        assert_eq!(ok.reasoning(), "fine");

        let bad = serde_json::from_str::<Verdict>(r#"{"score": 42, "reasoning": "nope"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn assessment_serializes_with_status_tag() {
        let judged = Assessment::Judged(Verdict::new(8, "relevant").unwrap());
        let json = serde_json::to_value(&judged).unwrap();
        assert_eq!(json["status"], "judged");
        assert_eq!(json["score"], 8);

        let failed = Assessment::Failed(JudgeFailure {
            kind: FailureKind::Timeout,
            detail: "deadline".to_string(),
        });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "timeout");
    }

    #[test]
    fn retrieval_mode_parses_case_insensitively() {
        assert_eq!("Hybrid".parse::<RetrievalMode>().unwrap(), RetrievalMode::Hybrid);
        assert_eq!(" lexical ".parse::<RetrievalMode>().unwrap(), RetrievalMode::Lexical);
        assert!("dense".parse::<RetrievalMode>().is_err());
    }

    #[test]
    fn retrieval_modes_order_for_reporting() {
        let mut modes = vec![RetrievalMode::Hybrid, RetrievalMode::Lexical, RetrievalMode::Semantic];
        modes.sort();
        assert_eq!(modes, RetrievalMode::ALL.to_vec());
    }
}
