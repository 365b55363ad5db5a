//! ReviewLens: hybrid retrieval over a review corpus with LLM relevance evaluation
//!
//! Features:
//! - BM25 lexical search via Tantivy
//! - Dense vector search with USearch (HNSW)
//! - Weighted fusion of normalized lexical and semantic scores
//! - An LLM relevance judge with a bounded JSON repair loop
//! - Per-mode evaluation runs, persisted results and score reports

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod generation;
pub mod index;
pub mod judge;
pub mod retrieval;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
