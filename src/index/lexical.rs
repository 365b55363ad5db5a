//! BM25 lexical index using Tantivy

use super::{boundary_tied, TIE_MARGIN};
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::types::DocumentId;
use std::path::Path;
use tantivy::{
    collector::TopDocs,
    doc,
    query::QueryParser,
    schema::{Field, Schema, Value, STORED, TEXT},
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument,
};
use tracing::{debug, info};

/// Writer heap budget used while building
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Read-only BM25 index over a corpus snapshot
pub struct LexicalIndex {
    index: Index,
    reader: IndexReader,
    fields: LexicalFields,
}

/// Schema fields for the lexical index
struct LexicalFields {
    row: Field,
    text: Field,
}

/// One BM25 match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalHit {
    pub row: DocumentId,
    pub score: f32,
}

impl LexicalIndex {
    /// Build an index in memory
    pub fn build_in_memory(corpus: &Corpus) -> Result<Self> {
        let (schema, fields) = Self::build_schema();
        let index = Index::create_in_ram(schema);
        Self::populate(&index, &fields, corpus)?;
        Self::from_index(index, fields)
    }

    /// Build an index on disk, replacing whatever is at `dir`
    pub fn create(dir: impl AsRef<Path>, corpus: &Corpus) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;

        let (schema, fields) = Self::build_schema();
        let index = Index::create_in_dir(dir, schema)?;
        Self::populate(&index, &fields, corpus)?;
        info!("Built lexical index at {}", dir.display());
        Self::from_index(index, fields)
    }

    /// Open an existing on-disk index
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.join("meta.json").exists() {
            return Err(Error::IndexUnavailable(format!(
                "no lexical index at {}",
                dir.display()
            )));
        }

        let index = Index::open_in_dir(dir)?;
        let schema = index.schema();
        let fields = LexicalFields {
            row: schema.get_field("row")?,
            text: schema.get_field("text")?,
        };
        info!("Opened lexical index at {}", dir.display());
        Self::from_index(index, fields)
    }

    /// Open the index at `dir` if present, otherwise build it there
    pub fn open_or_build(dir: impl AsRef<Path>, corpus: &Corpus) -> Result<Self> {
        match Self::open(dir.as_ref()) {
            Ok(index) => Ok(index),
            Err(Error::IndexUnavailable(_)) => Self::create(dir, corpus),
            Err(e) => Err(e),
        }
    }

    fn build_schema() -> (Schema, LexicalFields) {
        let mut schema_builder = Schema::builder();
        let row = schema_builder.add_u64_field("row", STORED);
        let text = schema_builder.add_text_field("text", TEXT);
        (schema_builder.build(), LexicalFields { row, text })
    }

    fn populate(index: &Index, fields: &LexicalFields, corpus: &Corpus) -> Result<()> {
        // One thread keeps a single segment whose doc ids follow row order.
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for document in corpus.iter() {
            writer.add_document(doc!(
                fields.row => document.row as u64,
                fields.text => document.text.as_str(),
            ))?;
        }
        writer.commit()?;
        debug!("Indexed {} documents for BM25", corpus.len());
        Ok(())
    }

    fn from_index(index: Index, fields: LexicalFields) -> Result<Self> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            index,
            reader,
            fields,
        })
    }

    /// Number of indexed documents
    pub fn num_docs(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    /// Top `k` documents by BM25 score, ties broken by ascending row.
    ///
    /// Query syntax errors are tolerated: natural-language queries are parsed
    /// leniently and unparseable fragments are dropped.
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<LexicalHit>> {
        if query_text.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let query_parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
        let (query, errors) = query_parser.parse_query_lenient(query_text);
        if !errors.is_empty() {
            debug!("Ignored {} query syntax error(s) in '{}'", errors.len(), query_text);
        }

        // Tantivy orders equal scores by doc address, not by row, so fetch
        // past the k-th hit until every document tied with it is collected
        let mut limit = k.saturating_add(TIE_MARGIN);
        let top_docs = loop {
            let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
            if top_docs.len() < limit || !boundary_tied(&top_docs, k, |(score, _)| *score) {
                break top_docs;
            }
            limit = limit.saturating_mul(2);
        };

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            let row = doc
                .get_first(self.fields.row)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| Error::IndexUnavailable("lexical document without a row".to_string()))?;
            hits.push(LexicalHit {
                row: row as DocumentId,
                score,
            });
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.row.cmp(&b.row)));
        hits.truncate(k);

        debug!("BM25 search for '{}': {} results", query_text, hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus() -> Corpus {
        Corpus::from_texts([
            "The quick brown fox jumps over the lazy dog",
            "A fast cat runs across the street",
            "The fox and the cat are friends",
        ])
    }

    #[test]
    fn search_ranks_best_match_first() {
        let index = LexicalIndex::build_in_memory(&corpus()).unwrap();
        assert_eq!(index.num_docs(), 3);

        let hits = index.search("fox jumps", 10).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].row, 0);
        assert!(hits.iter().all(|h| h.row != 1));
    }

    #[test]
    fn empty_query_returns_empty() {
        let index = LexicalIndex::build_in_memory(&corpus()).unwrap();
        assert!(index.search("", 10).unwrap().is_empty());
        assert!(index.search("   \t", 10).unwrap().is_empty());
    }

    #[test]
    fn query_syntax_characters_do_not_fail() {
        let index = LexicalIndex::build_in_memory(&corpus()).unwrap();
        let hits = index.search("fox: \"cat (", 10).unwrap();
        assert!(hits.len() <= 3);
    }

    #[test]
    fn equal_scores_break_by_row() {
        let corpus = Corpus::from_texts(["echo", "delta", "echo", "echo"]);
        let index = LexicalIndex::build_in_memory(&corpus).unwrap();
        let rows: Vec<DocumentId> = index.search("echo", 10).unwrap().iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![0, 2, 3]);
    }

    #[test]
    fn ties_at_the_cutoff_keep_lowest_rows() {
        let mut texts = vec!["unrelated words"; 3];
        texts.extend(std::iter::repeat("echo film").take(40));
        let index = LexicalIndex::build_in_memory(&Corpus::from_texts(texts)).unwrap();

        let rows: Vec<DocumentId> = index.search("echo film", 3).unwrap().iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![3, 4, 5]);
    }

    #[test]
    fn respects_limit() {
        let index = LexicalIndex::build_in_memory(&corpus()).unwrap();
        assert_eq!(index.search("the", 2).unwrap().len(), 2);
    }

    #[test]
    fn search_with_no_documents() {
        let index = LexicalIndex::build_in_memory(&Corpus::default()).unwrap();
        assert!(index.search("anything", 10).unwrap().is_empty());
    }

    #[test]
    fn open_missing_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let err = LexicalIndex::open(temp_dir.path().join("lexical")).err().unwrap();
        assert!(matches!(err, Error::IndexUnavailable(_)));
    }

    #[test]
    fn persisted_index_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("lexical");
        LexicalIndex::create(&dir, &corpus()).unwrap();

        let reopened = LexicalIndex::open_or_build(&dir, &Corpus::default()).unwrap();
        assert_eq!(reopened.num_docs(), 3);
        assert_eq!(reopened.search("lazy dog", 5).unwrap()[0].row, 0);
    }
}
