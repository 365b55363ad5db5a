//! Retrieve-then-judge evaluation over a set of queries

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::generation::TextGenerator;
use crate::judge::RelevanceJudge;
use crate::retrieval::Retrievers;
use crate::types::{Assessment, FailureKind, JudgeFailure, QueryResult, RetrievalMode, RetrievedDocument};
use crate::util::truncate_str;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs every query through each configured retrieval mode and judges the
/// retrieved documents in retrieval order
#[derive(Debug, Clone)]
pub struct EvaluationRunner {
    top_k: usize,
    modes: Vec<RetrievalMode>,
}

impl EvaluationRunner {
    /// Runner over all modes retrieving `top_k` documents per query
    pub fn new(top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::invalid("top_k must be positive"));
        }
        Ok(Self {
            top_k,
            modes: RetrievalMode::ALL.to_vec(),
        })
    }

    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        Self::new(config.top_k)
    }

    /// Restrict the run to `modes` (deduplicated, in mode order)
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = RetrievalMode>) -> Self {
        let mut modes: Vec<_> = modes.into_iter().collect();
        modes.sort();
        modes.dedup();
        self.modes = modes;
        self
    }

    pub fn modes(&self) -> &[RetrievalMode] {
        &self.modes
    }

    /// Evaluate every query under every mode.
    ///
    /// Judge failures are recorded in the results; retrieval and other
    /// structural errors abort the run.
    pub async fn run(
        &self,
        queries: &[String],
        retrievers: &Retrievers,
        judge: &RelevanceJudge,
        generator: &dyn TextGenerator,
    ) -> Result<BTreeMap<RetrievalMode, Vec<QueryResult>>> {
        let mut results = BTreeMap::new();
        for &mode in &self.modes {
            let started = Instant::now();
            let mut mode_results = Vec::with_capacity(queries.len());
            for query in queries {
                mode_results.push(self.evaluate_query(mode, query, retrievers, judge, generator).await?);
            }
            info!(
                "Evaluated {} queries with {} search in {:.1}s",
                queries.len(),
                mode,
                started.elapsed().as_secs_f64()
            );
            results.insert(mode, mode_results);
        }
        Ok(results)
    }

    /// Retrieve and judge the top documents for one query under one mode.
    ///
    /// The first judge failure is recorded as a failed assessment and stops
    /// judging of the remaining documents for this query.
    pub async fn evaluate_query(
        &self,
        mode: RetrievalMode,
        query: &str,
        retrievers: &Retrievers,
        judge: &RelevanceJudge,
        generator: &dyn TextGenerator,
    ) -> Result<QueryResult> {
        let ranked = retrievers.retrieve(mode, query, self.top_k)?;
        debug!(
            "{} search for '{}' returned {} documents",
            mode,
            truncate_str(query, 60),
            ranked.len()
        );

        let mut result = QueryResult::new(query, mode);
        for hit in ranked {
            let document = hit.document;
            let evaluation = match judge.evaluate(query, &document, generator).await {
                Ok(verdict) => Assessment::Judged(verdict),
                Err(e) => match failure_of(&e) {
                    Some(failure) => {
                        warn!(
                            "Judge failed on row {} for '{}' ({} search); skipping remaining documents: {}",
                            document.row,
                            truncate_str(query, 60),
                            mode,
                            e
                        );
                        result.aborted = true;
                        Assessment::Failed(failure)
                    }
                    None => return Err(e),
                },
            };

            result.retrieved_documents.push(RetrievedDocument {
                row: document.row,
                text: document.text.clone(),
                evaluation,
            });
            if result.aborted {
                break;
            }
        }
        Ok(result)
    }
}

/// Sentinel for errors local to one judged document
fn failure_of(err: &Error) -> Option<JudgeFailure> {
    let kind = match err {
        Error::JudgeUnparseable { .. } => FailureKind::Unparseable,
        Error::JudgeTimeout { .. } => FailureKind::Timeout,
        Error::Generation(_) => FailureKind::Generation,
        _ => return None,
    };
    debug_assert!(err.is_judge_failure());
    Some(JudgeFailure {
        kind,
        detail: err.to_string(),
    })
}
