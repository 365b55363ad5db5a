//! Corpus input and result output locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the corpus comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Headered CSV file holding one document per record
    pub path: PathBuf,
    /// Column containing the document text
    #[serde(default = "default_text_column")]
    pub text_column: String,
}

fn default_text_column() -> String {
    "review".to_string()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/imdb_dataset.csv"),
            text_column: default_text_column(),
        }
    }
}

/// Where evaluation results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("output"),
        }
    }
}
