//! Lexical and vector indexes over one corpus snapshot
//!
//! Both indexes are keyed by corpus row and are read-only once built.

mod lexical;
mod vector;

pub use lexical::{LexicalHit, LexicalIndex};
pub use vector::{VectorHit, VectorIndex};

use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::embedding::EmbeddingBackend;
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Extra hits fetched beyond `k` when looking for ties at the cutoff
pub(crate) const TIE_MARGIN: usize = 16;

/// Whether the last of `sorted` (best first) still scores the same as the
/// k-th entry, meaning more ties may lie beyond the fetched window
pub(crate) fn boundary_tied<T, S: PartialEq>(sorted: &[T], k: usize, score: impl Fn(&T) -> S) -> bool {
    match (k.checked_sub(1).and_then(|i| sorted.get(i)), sorted.last()) {
        (Some(kth), Some(last)) => sorted.len() > k && score(kth) == score(last),
        _ => false,
    }
}

/// The pair of indexes built from the same corpus
pub struct IndexSet {
    pub lexical: Arc<LexicalIndex>,
    pub vector: Arc<VectorIndex>,
}

impl IndexSet {
    /// Build both indexes in memory (nothing is persisted)
    pub fn in_memory(
        corpus: &Corpus,
        embedder: &dyn EmbeddingBackend,
        config: &IndexConfig,
        batch_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            lexical: Arc::new(LexicalIndex::build_in_memory(corpus)?),
            vector: Arc::new(VectorIndex::build(corpus, embedder, config, batch_size)?),
        })
    }

    /// Build both indexes and persist them under `config.data_dir`
    pub fn build(
        corpus: &Corpus,
        embedder: &dyn EmbeddingBackend,
        config: &IndexConfig,
        batch_size: usize,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let lexical = LexicalIndex::create(config.lexical_dir(), corpus)?;
        let vector = VectorIndex::build(corpus, embedder, config, batch_size)?;
        vector.save(config.vector_path())?;

        info!(
            "Indexed {} documents under {}",
            corpus.len(),
            config.data_dir.display()
        );
        Ok(Self {
            lexical: Arc::new(lexical),
            vector: Arc::new(vector),
        })
    }

    /// Open persisted indexes, verifying they match the corpus and embedder
    pub fn open(corpus: &Corpus, embedder: &dyn EmbeddingBackend, config: &IndexConfig) -> Result<Self> {
        let set = Self {
            lexical: Arc::new(LexicalIndex::open(config.lexical_dir())?),
            vector: Arc::new(VectorIndex::load(config.vector_path(), config)?),
        };
        set.check_consistency(corpus, embedder)?;
        Ok(set)
    }

    /// Open persisted indexes if present, otherwise build and persist them
    pub fn open_or_build(
        corpus: &Corpus,
        embedder: &dyn EmbeddingBackend,
        config: &IndexConfig,
        batch_size: usize,
    ) -> Result<Self> {
        match Self::open(corpus, embedder, config) {
            Ok(set) => Ok(set),
            Err(Error::IndexUnavailable(reason)) => {
                info!("Building indexes ({})", reason);
                Self::build(corpus, embedder, config, batch_size)
            }
            Err(e) => Err(e),
        }
    }

    fn check_consistency(&self, corpus: &Corpus, embedder: &dyn EmbeddingBackend) -> Result<()> {
        let lexical_docs = self.lexical.num_docs();
        let vector_docs = self.vector.len();
        if lexical_docs != corpus.len() || vector_docs != corpus.len() {
            return Err(Error::IndexUnavailable(format!(
                "stale indexes: corpus has {} documents, lexical index {}, vector index {}",
                corpus.len(),
                lexical_docs,
                vector_docs
            )));
        }
        if self.vector.dimensions() != embedder.dimensions() {
            return Err(Error::IndexUnavailable(format!(
                "vector index has {} dimensions but the embedder produces {}",
                self.vector.dimensions(),
                embedder.dimensions()
            )));
        }
        Ok(())
    }
}
