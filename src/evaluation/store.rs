//! On-disk persistence of evaluation results, one JSON file per mode

use crate::error::{Error, Result};
use crate::types::{QueryResult, RetrievalMode};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads and writes `search_<mode>.json` files under a results directory
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the results of `mode`
    pub fn path_for(&self, mode: RetrievalMode) -> PathBuf {
        self.dir.join(format!("search_{}.json", mode))
    }

    /// Write the results of one mode, replacing any previous file
    pub fn write(&self, mode: RetrievalMode, results: &[QueryResult]) -> Result<PathBuf> {
        if let Some(stray) = results.iter().find(|r| r.mode != mode) {
            return Err(Error::invalid(format!(
                "result for '{}' has mode {} but is being written as {}",
                stray.query, stray.mode, mode
            )));
        }
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(mode);
        let json = serde_json::to_string_pretty(results)?;

        // Write atomically using temp file
        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        info!("Wrote {} {} results to {}", results.len(), mode, path.display());
        Ok(path)
    }

    /// Write every mode in `results`
    pub fn write_all(&self, results: &BTreeMap<RetrievalMode, Vec<QueryResult>>) -> Result<Vec<PathBuf>> {
        results
            .iter()
            .map(|(&mode, mode_results)| self.write(mode, mode_results))
            .collect()
    }

    /// Read the results of one mode
    pub fn read(&self, mode: RetrievalMode) -> Result<Vec<QueryResult>> {
        let path = self.path_for(mode);
        let json = fs::read_to_string(&path)?;
        let results: Vec<QueryResult> = serde_json::from_str(&json)?;
        debug!("Read {} {} results from {}", results.len(), mode, path.display());
        Ok(results)
    }

    /// Read every mode that has a results file; modes without one are skipped
    pub fn read_all(&self) -> Result<BTreeMap<RetrievalMode, Vec<QueryResult>>> {
        let mut all = BTreeMap::new();
        for mode in RetrievalMode::ALL {
            if !self.path_for(mode).exists() {
                warn!("No {} results in {}", mode, self.dir.display());
                continue;
            }
            all.insert(mode, self.read(mode)?);
        }
        Ok(all)
    }
}
