//! Per-mode average relevance scores

use crate::types::{QueryResult, RetrievalMode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Aggregate judgments for one retrieval mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModePerformance {
    pub mode: RetrievalMode,
    /// Mean verdict score rounded to two decimals; `None` when nothing was judged
    pub average_score: Option<f64>,
    pub queries: usize,
    pub judged: usize,
    pub failed: usize,
    pub aborted_queries: usize,
}

impl ModePerformance {
    pub fn from_results(mode: RetrievalMode, results: &[QueryResult]) -> Self {
        let mut total: u64 = 0;
        let mut judged = 0;
        let mut failed = 0;

        for document in results.iter().flat_map(|r| &r.retrieved_documents) {
            match document.evaluation.verdict() {
                Some(verdict) => {
                    total += u64::from(verdict.score());
                    judged += 1;
                }
                None => failed += 1,
            }
        }

        let average_score = (judged > 0).then(|| round2(total as f64 / judged as f64));
        Self {
            mode,
            average_score,
            queries: results.len(),
            judged,
            failed,
            aborted_queries: results.iter().filter(|r| r.aborted).count(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Average relevance per retrieval mode, in mode order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub modes: Vec<ModePerformance>,
}

impl PerformanceReport {
    pub fn from_results(results: &BTreeMap<RetrievalMode, Vec<QueryResult>>) -> Self {
        Self {
            modes: results
                .iter()
                .map(|(&mode, mode_results)| ModePerformance::from_results(mode, mode_results))
                .collect(),
        }
    }

    pub fn get(&self, mode: RetrievalMode) -> Option<&ModePerformance> {
        self.modes.iter().find(|m| m.mode == mode)
    }

    /// Mode with the highest average score, if any mode was judged
    pub fn best(&self) -> Option<&ModePerformance> {
        self.modes
            .iter()
            .filter(|m| m.average_score.is_some())
            .max_by(|a, b| {
                a.average_score
                    .unwrap_or_default()
                    .total_cmp(&b.average_score.unwrap_or_default())
                    .then(b.mode.cmp(&a.mode))
            })
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average scores:")?;
        for mode in &self.modes {
            match mode.average_score {
                Some(average) => write!(f, "  {} search: {:.2}", mode.mode, average)?,
                None => write!(f, "  {} search: n/a", mode.mode)?,
            }
            write!(f, " ({} judged", mode.judged)?;
            if mode.failed > 0 {
                write!(f, ", {} failed", mode.failed)?;
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Assessment, FailureKind, JudgeFailure, RetrievedDocument, Verdict};

    fn judged(score: i64) -> RetrievedDocument {
        RetrievedDocument {
            row: 0,
            text: String::new(),
            evaluation: Assessment::Judged(Verdict::new(score, "").unwrap()),
        }
    }

    fn failed() -> RetrievedDocument {
        RetrievedDocument {
            row: 0,
            text: String::new(),
            evaluation: Assessment::Failed(JudgeFailure {
                kind: FailureKind::Timeout,
                detail: "slow".to_string(),
            }),
        }
    }

    fn result(mode: RetrievalMode, documents: Vec<RetrievedDocument>) -> QueryResult {
        QueryResult {
            query: "q".to_string(),
            mode,
            aborted: documents.iter().any(|d| d.evaluation.is_failed()),
            retrieved_documents: documents,
        }
    }

    #[test]
    fn mean_is_rounded_and_ignores_failures() {
        let results = vec![
            result(RetrievalMode::Lexical, vec![judged(7), judged(8)]),
            result(RetrievalMode::Lexical, vec![judged(5), failed()]),
        ];
        let performance = ModePerformance::from_results(RetrievalMode::Lexical, &results);

        assert_eq!(performance.average_score, Some(6.67));
        assert_eq!(performance.judged, 3);
        assert_eq!(performance.failed, 1);
        assert_eq!(performance.queries, 2);
        assert_eq!(performance.aborted_queries, 1);
    }

    #[test]
    fn nothing_judged_has_no_average() {
        let results = vec![result(RetrievalMode::Semantic, vec![failed()])];
        let performance = ModePerformance::from_results(RetrievalMode::Semantic, &results);
        assert_eq!(performance.average_score, None);
        assert_eq!(ModePerformance::from_results(RetrievalMode::Semantic, &[]).average_score, None);
    }

    #[test]
    fn report_covers_each_mode_and_picks_best() {
        let mut results = BTreeMap::new();
        results.insert(RetrievalMode::Hybrid, vec![result(RetrievalMode::Hybrid, vec![judged(9)])]);
        results.insert(RetrievalMode::Lexical, vec![result(RetrievalMode::Lexical, vec![judged(4)])]);
        let report = PerformanceReport::from_results(&results);

        assert_eq!(report.modes.len(), 2);
        assert_eq!(report.modes[0].mode, RetrievalMode::Lexical);
        assert_eq!(report.get(RetrievalMode::Hybrid).unwrap().average_score, Some(9.0));
        assert!(report.get(RetrievalMode::Semantic).is_none());
        assert_eq!(report.best().unwrap().mode, RetrievalMode::Hybrid);

        let text = report.to_string();
        assert!(text.contains("lexical search: 4.00 (1 judged)"));
        assert!(text.contains("hybrid search: 9.00"));
    }
}
