//! Corpus snapshot shared by both indexes

use crate::error::{Error, Result};
use crate::types::{Document, DocumentId};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// An immutable, row-addressed collection of documents
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Arc<Document>>,
}

impl Corpus {
    /// Build a corpus from texts; each text's position becomes its row
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents = texts
            .into_iter()
            .enumerate()
            .map(|(row, text)| Arc::new(Document::new(row, text)))
            .collect();
        Self { documents }
    }

    /// Load a headered CSV, taking document text from `text_column`.
    ///
    /// Other columns (labels, ids) are ignored. Rows are the 0-based record
    /// positions in the file.
    pub fn from_csv(path: impl AsRef<Path>, text_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == text_column)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "column '{}' not found in {}",
                    text_column,
                    path.display()
                ))
            })?;

        let mut texts = Vec::new();
        for record in reader.records() {
            let record = record?;
            texts.push(record.get(column).unwrap_or_default().to_string());
        }

        info!("Loaded {} documents from {}", texts.len(), path.display());
        Ok(Self::from_texts(texts))
    }

    pub fn get(&self, row: DocumentId) -> Option<&Arc<Document>> {
        self.documents.get(row)
    }

    /// Resolve a row reported by an index, failing if the index is out of step
    pub(crate) fn resolve(&self, row: DocumentId) -> Result<Arc<Document>> {
        self.get(row).cloned().ok_or_else(|| {
            Error::IndexUnavailable(format!(
                "index references row {} but the corpus has {} documents",
                row,
                self.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.iter()
    }
}
