use super::Workspace;
use anyhow::Result;
use reviewlens::config::Config;
use std::time::Instant;

pub async fn build_indexes(config: Config, force: bool) -> Result<()> {
    let start = Instant::now();
    let workspace = Workspace::load_blocking(&config, force).await?;

    println!("Indexed {} documents", workspace.corpus.len());
    println!("  Lexical index: {}", config.index.lexical_dir().display());
    println!(
        "  Vector index:  {} ({} dimensions, {} embeddings)",
        config.index.vector_path().display(),
        workspace.indexes.vector.dimensions(),
        workspace.embedder.name()
    );
    println!("  Time: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}
