use anyhow::{bail, Result};
use reviewlens::evaluation::{PerformanceReport, ResultStore};
use std::path::PathBuf;

pub async fn show_report(results_dir: PathBuf, format: String) -> Result<()> {
    let store = ResultStore::new(results_dir);
    let results = store.read_all()?;
    if results.is_empty() {
        bail!(
            "No evaluation results in {} (run `reviewlens evaluate` first)",
            store.dir().display()
        );
    }

    let report = PerformanceReport::from_results(&results);
    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            print!("{}", report);
            if let Some(best) = report.best() {
                println!("Best: {} search", best.mode);
            }
        }
    }
    Ok(())
}
