//! BM25 leaf retriever

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::index::LexicalIndex;
use crate::types::{RetrievalSource, ScoredCandidate};
use std::sync::Arc;
use tracing::debug;

/// Ranks documents by BM25 term overlap with the query
pub struct LexicalRetriever {
    index: Arc<LexicalIndex>,
    corpus: Arc<Corpus>,
}

impl LexicalRetriever {
    pub fn new(index: Arc<LexicalIndex>, corpus: Arc<Corpus>) -> Self {
        Self { index, corpus }
    }

    /// At most `k` candidates, highest BM25 score first, ties by ascending row
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredCandidate>> {
        if k == 0 {
            return Err(Error::invalid("k must be positive"));
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self
            .index
            .search(query, k)?
            .into_iter()
            .map(|hit| {
                Ok(ScoredCandidate {
                    document: self.corpus.resolve(hit.row)?,
                    score: hit.score,
                    source: RetrievalSource::Lexical,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Lexical retrieval: {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn retriever(texts: &[&str]) -> LexicalRetriever {
        let corpus = Arc::new(Corpus::from_texts(texts.iter().copied()));
        let index = Arc::new(LexicalIndex::build_in_memory(&corpus).unwrap());
        LexicalRetriever::new(index, corpus)
    }

    #[test]
    fn ranks_matching_documents() {
        let retriever = retriever(&["great movie", "terrible film", "great and terrible"]);
        let candidates = retriever.retrieve("great", 3).unwrap();

        let rows: Vec<usize> = candidates.iter().map(|c| c.row()).collect();
        assert_eq!(rows, vec![0, 2]);
        assert!(candidates.iter().all(|c| c.source == RetrievalSource::Lexical));
        assert_eq!(candidates[0].document.text, "great movie");
    }

    #[test]
    fn output_is_bounded_sorted_and_unique() {
        let retriever = retriever(&[
            "the cast was great",
            "the plot was great and the cast was great",
            "the soundtrack",
            "great great great",
            "nothing here",
        ]);
        for k in 1..=5 {
            let candidates = retriever.retrieve("great cast", k).unwrap();
            assert!(candidates.len() <= k);
            assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
            let unique: HashSet<usize> = candidates.iter().map(|c| c.row()).collect();
            assert_eq!(unique.len(), candidates.len());
        }
    }

    #[test]
    fn ties_at_the_cutoff_break_by_row() {
        let mut texts = vec!["courtroom drama"];
        texts.extend(std::iter::repeat("echo film").take(40));
        let retriever = retriever(&texts);

        let rows: Vec<usize> = retriever
            .retrieve("echo film", 3)
            .unwrap()
            .iter()
            .map(|c| c.row())
            .collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[test]
    fn blank_query_is_empty_not_error() {
        let retriever = retriever(&["anything"]);
        assert!(retriever.retrieve("  ", 5).unwrap().is_empty());
    }

    #[test]
    fn zero_k_is_invalid() {
        let retriever = retriever(&["anything"]);
        assert!(matches!(retriever.retrieve("anything", 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn index_out_of_step_with_corpus_is_unavailable() {
        let full = Corpus::from_texts(["alpha", "beta", "gamma"]);
        let index = Arc::new(LexicalIndex::build_in_memory(&full).unwrap());
        let truncated = Arc::new(Corpus::from_texts(["alpha"]));
        let retriever = LexicalRetriever::new(index, truncated);

        let err = retriever.retrieve("gamma", 3).unwrap_err();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }
}
