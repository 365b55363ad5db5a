//! CLI command implementations

mod evaluate;
mod index;
mod init;
mod report;
mod search;

pub use evaluate::run_evaluation;
pub use index::build_indexes;
pub use init::init_config;
pub use report::show_report;
pub use search::search_corpus;

use anyhow::{Context, Result};
use reviewlens::{
    config::Config,
    corpus::Corpus,
    embedding::{create_backend, EmbeddingBackend},
    index::IndexSet,
    retrieval::Retrievers,
};
use std::sync::Arc;

/// Corpus, embedder and indexes loaded for one command
pub(crate) struct Workspace {
    pub corpus: Arc<Corpus>,
    pub embedder: Arc<dyn EmbeddingBackend>,
    pub indexes: IndexSet,
}

impl Workspace {
    /// Load the corpus and open its indexes, building them if absent or
    /// `rebuild` is set
    pub fn load(config: &Config, rebuild: bool) -> Result<Self> {
        let corpus = Corpus::from_csv(&config.corpus.path, &config.corpus.text_column)
            .with_context(|| format!("Failed to load corpus from {}", config.corpus.path.display()))?;

        let embedder = create_backend(&config.embedding.backend).context("Failed to initialize embedding backend")?;
        let batch_size = config.embedding.index_batch_size;

        let indexes = if rebuild {
            IndexSet::build(&corpus, embedder.as_ref(), &config.index, batch_size)?
        } else {
            IndexSet::open_or_build(&corpus, embedder.as_ref(), &config.index, batch_size)?
        };

        Ok(Self {
            corpus: Arc::new(corpus),
            embedder,
            indexes,
        })
    }

    /// Like [`Workspace::load`], on the blocking thread pool
    pub async fn load_blocking(config: &Config, rebuild: bool) -> Result<Self> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::load(&config, rebuild))
            .await
            .context("Index loading task failed")?
    }

    pub fn retrievers(&self, config: &Config) -> Result<Retrievers> {
        Ok(Retrievers::new(
            self.corpus.clone(),
            &self.indexes,
            self.embedder.clone(),
            &config.retrieval,
        )?)
    }
}
