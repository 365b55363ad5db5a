//! HNSW vector index using USearch
//!
//! Keys are corpus rows, so no separate key mapping is persisted.

use super::{boundary_tied, TIE_MARGIN};
use crate::config::IndexConfig;
use crate::corpus::Corpus;
use crate::embedding::EmbeddingBackend;
use crate::error::{Error, Result};
use crate::types::DocumentId;
use std::path::Path;
use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

/// Vector index over precomputed document embeddings
pub struct VectorIndex {
    index: Index,
    dimensions: usize,
}

/// One nearest-neighbour match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    pub row: DocumentId,
    /// Cosine distance (0 = identical direction)
    pub distance: f32,
}

impl VectorIndex {
    fn options(dimensions: usize, config: &IndexConfig) -> IndexOptions {
        IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: config.hnsw_m,
            expansion_add: config.hnsw_ef_construction,
            expansion_search: config.hnsw_ef_search,
            multi: false,
        }
    }

    /// Create an empty index with room for `capacity` vectors
    pub fn new(dimensions: usize, capacity: usize, config: &IndexConfig) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::invalid("vector index dimensions must be positive"));
        }
        debug!(
            "Creating vector index: {} dimensions, M={}, ef_construction={}",
            dimensions, config.hnsw_m, config.hnsw_ef_construction
        );

        let index = Index::new(&Self::options(dimensions, config)).map_err(Error::vector)?;
        index.reserve(capacity.max(1)).map_err(Error::vector)?;
        Ok(Self { index, dimensions })
    }

    /// Embed every corpus document and index it under its row
    pub fn build(
        corpus: &Corpus,
        embedder: &dyn EmbeddingBackend,
        config: &IndexConfig,
        batch_size: usize,
    ) -> Result<Self> {
        let index = Self::new(embedder.dimensions(), corpus.len(), config)?;
        let documents: Vec<_> = corpus.iter().collect();

        for batch in documents.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts)?;
            if embeddings.len() != batch.len() {
                return Err(Error::vector(format!(
                    "embedder returned {} vectors for {} documents",
                    embeddings.len(),
                    batch.len()
                )));
            }
            for (document, embedding) in batch.iter().zip(&embeddings) {
                index.add(document.row, embedding)?;
            }
            debug!("Embedded {}/{} documents", index.len(), corpus.len());
        }

        info!(
            "Built vector index: {} documents via {} embeddings",
            index.len(),
            embedder.name()
        );
        Ok(index)
    }

    /// Load an index saved with [`VectorIndex::save`]
    pub fn load(path: impl AsRef<Path>, config: &IndexConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::IndexUnavailable(format!(
                "no vector index at {}",
                path.display()
            )));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::invalid(format!("non UTF-8 path {}", path.display())))?;

        // Dimensions are read from the file
        let index = Index::new(&Self::options(0, config)).map_err(Error::vector)?;
        index.load(path_str).map_err(Error::vector)?;
        let dimensions = index.dimensions();

        info!("Loaded vector index from {} ({} vectors)", path.display(), index.size());
        Ok(Self { index, dimensions })
    }

    /// Load the index at `path` if present, otherwise build it and save it there
    pub fn open_or_build(
        path: impl AsRef<Path>,
        corpus: &Corpus,
        embedder: &dyn EmbeddingBackend,
        config: &IndexConfig,
        batch_size: usize,
    ) -> Result<Self> {
        match Self::load(path.as_ref(), config) {
            Ok(index) => Ok(index),
            Err(Error::IndexUnavailable(_)) => {
                let index = Self::build(corpus, embedder, config, batch_size)?;
                index.save(path)?;
                Ok(index)
            }
            Err(e) => Err(e),
        }
    }

    /// Save the index to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::invalid(format!("non UTF-8 path {}", path.display())))?;
        self.index.save(path_str).map_err(Error::vector)?;
        info!("Saved vector index to {}", path.display());
        Ok(())
    }

    /// Add one embedding under `row`
    pub fn add(&self, row: DocumentId, embedding: &[f32]) -> Result<()> {
        self.check_dimensions(embedding)?;
        if self.index.size() >= self.index.capacity() {
            self.index
                .reserve((self.index.capacity() * 2).max(16))
                .map_err(Error::vector)?;
        }
        self.index.add(row as u64, embedding).map_err(Error::vector)
    }

    /// The `k` nearest rows by cosine distance, closest first, ties by ascending row
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        self.check_dimensions(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        // HNSW traversal decides which of several equidistant vectors it
        // reaches first; widen the search until the k-th distance is settled
        let mut limit = k.saturating_add(TIE_MARGIN);
        let mut hits = loop {
            let hits = self.search(query, limit)?;
            if limit >= self.len() || !boundary_tied(&hits, k, |h| h.distance) {
                break hits;
            }
            limit = limit.saturating_mul(2);
        };
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row)));
        hits.dedup_by_key(|h| h.row);
        hits.truncate(k);
        Ok(hits)
    }

    /// Raw HNSW matches, closest first
    fn search(&self, query: &[f32], count: usize) -> Result<Vec<VectorHit>> {
        let matches = self.index.search(query, count).map_err(Error::vector)?;
        Ok(matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .map(|(&key, &distance)| VectorHit {
                row: key as DocumentId,
                // Zero vectors have no direction; treat them as orthogonal.
                distance: if distance.is_finite() { distance } else { 1.0 },
            })
            .collect())
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::invalid(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use tempfile::TempDir;

    fn corpus() -> Corpus {
        Corpus::from_texts([
            "space opera with epic battles",
            "romantic comedy in paris",
            "documentary about deep sea creatures",
        ])
    }

    #[test]
    fn nearest_finds_exact_document() {
        let embedder = HashEmbedder::new(64).unwrap();
        let index = VectorIndex::build(&corpus(), &embedder, &IndexConfig::default(), 2).unwrap();
        assert_eq!(index.len(), 3);

        let query = embedder.embed("romantic comedy in paris").unwrap();
        let hits = index.nearest(&query, 3).unwrap();
        assert_eq!(hits[0].row, 1);
        assert!(hits[0].distance < 1e-4);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn equidistant_vectors_keep_lowest_rows() {
        let mut texts = vec!["space opera", "deep sea creatures"];
        texts.extend(std::iter::repeat("echo film").take(40));
        let corpus = Corpus::from_texts(texts);
        let embedder = HashEmbedder::new(32).unwrap();
        let index = VectorIndex::build(&corpus, &embedder, &IndexConfig::default(), 8).unwrap();

        let query = embedder.embed("echo film").unwrap();
        let rows: Vec<DocumentId> = index.nearest(&query, 3).unwrap().iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![2, 3, 4]);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let index = VectorIndex::new(4, 1, &IndexConfig::default()).unwrap();
        assert!(matches!(index.add(0, &[1.0, 0.0]), Err(Error::InvalidArgument(_))));
        assert!(matches!(index.nearest(&[1.0], 1), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::new(4, 0, &IndexConfig::default()).unwrap();
        assert!(index.nearest(&[1.0, 0.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vectors.usearch");
        let embedder = HashEmbedder::new(32).unwrap();
        let config = IndexConfig::default();

        VectorIndex::build(&corpus(), &embedder, &config, 8)
            .unwrap()
            .save(&path)
            .unwrap();

        let loaded = VectorIndex::load(&path, &config).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.dimensions(), 32);
        let query = embedder.embed("deep sea creatures").unwrap();
        assert_eq!(loaded.nearest(&query, 1).unwrap()[0].row, 2);
    }

    #[test]
    fn open_or_build_saves_on_first_use() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("vectors.usearch");
        let embedder = HashEmbedder::new(16).unwrap();
        let config = IndexConfig::default();

        let built = VectorIndex::open_or_build(&path, &corpus(), &embedder, &config, 4).unwrap();
        assert_eq!(built.len(), 3);
        assert!(path.exists());

        let reopened = VectorIndex::open_or_build(&path, &Corpus::default(), &embedder, &config, 4).unwrap();
        assert_eq!(reopened.len(), 3);
    }

    #[test]
    fn load_missing_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let err = VectorIndex::load(temp_dir.path().join("nope.usearch"), &IndexConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }
}
