use super::Workspace;
use anyhow::{bail, Context, Result};
use reviewlens::{
    config::Config,
    evaluation::{EvaluationRunner, PerformanceReport, ResultStore},
    generation::HttpGenerator,
    judge::RelevanceJudge,
    types::RetrievalMode,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub async fn run_evaluation(
    config: Config,
    queries_path: PathBuf,
    modes: Vec<RetrievalMode>,
    results_dir: Option<PathBuf>,
) -> Result<()> {
    let start = Instant::now();
    let queries = read_queries(&queries_path)?;
    if queries.is_empty() {
        bail!("No queries in {}", queries_path.display());
    }
    info!("Loaded {} queries from {}", queries.len(), queries_path.display());

    let workspace = Workspace::load_blocking(&config, false).await?;
    let retrievers = workspace.retrievers(&config)?;
    let judge = RelevanceJudge::new(config.judge.clone())?;
    let generator = HttpGenerator::new(config.generation.clone()).context("Failed to initialize text generation")?;

    let mut runner = EvaluationRunner::from_config(&config.retrieval)?;
    if !modes.is_empty() {
        runner = runner.with_modes(modes);
    }

    let results = runner.run(&queries, &retrievers, &judge, &generator).await?;

    let store = ResultStore::new(results_dir.unwrap_or_else(|| config.output.results_dir.clone()));
    for path in store.write_all(&results)? {
        println!("Wrote {}", path.display());
    }

    print!("\n{}", PerformanceReport::from_results(&results));
    println!("Time: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// One query per line; blank lines and `#` comments are skipped
fn read_queries(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read queries from {}", path.display()))?;
    Ok(parse_queries(&content))
}

fn parse_queries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
