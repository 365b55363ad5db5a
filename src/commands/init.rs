use anyhow::{bail, Context, Result};
use reviewlens::config::Config;
use std::path::PathBuf;

pub async fn init_config(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = Config::default();
    let toml_content = format!(
        r#"# ReviewLens Configuration

[corpus]
path = "{corpus}"
text_column = "{column}"

# Offline hashing embeddings; switch to an OpenAI-compatible endpoint with:
#   backend = "http"
#   endpoint = "http://localhost:8080/v1/embeddings"
#   model = "BAAI/bge-small-en-v1.5"
#   dimensions = 384
[embedding]
backend = "hash"
dimensions = {dimensions}
index_batch_size = {batch}

[index]
data_dir = "{data_dir}"
hnsw_m = {m}
hnsw_ef_construction = {ef_construction}
hnsw_ef_search = {ef_search}

[retrieval]
top_k = {top_k}
candidate_count = {candidates}
weight_lexical = {weight_lexical:.1}
weight_semantic = {weight_semantic:.1}
normalization = "min_max"
rrf_k = {rrf_k}
parallel_leaves = true

[judge]
max_attempts = {max_attempts}
timeout_secs = {judge_timeout}

[generation]
endpoint = "{endpoint}"
model = "{model}"
temperature = {temperature:.1}
max_tokens = {max_tokens}
timeout_secs = {generation_timeout}

[output]
results_dir = "{results_dir}"

[logging]
format = "text"
level = "info"
"#,
        corpus = config.corpus.path.display(),
        column = config.corpus.text_column,
        dimensions = config.embedding.dimensions(),
        batch = config.embedding.index_batch_size,
        data_dir = config.index.data_dir.display(),
        m = config.index.hnsw_m,
        ef_construction = config.index.hnsw_ef_construction,
        ef_search = config.index.hnsw_ef_search,
        top_k = config.retrieval.top_k,
        candidates = config.retrieval.candidate_count,
        weight_lexical = config.retrieval.weight_lexical,
        weight_semantic = config.retrieval.weight_semantic,
        rrf_k = config.retrieval.rrf_k,
        max_attempts = config.judge.max_attempts,
        judge_timeout = config.judge.timeout_secs.unwrap_or(120),
        endpoint = config.generation.endpoint,
        model = config.generation.model,
        temperature = config.generation.temperature,
        max_tokens = config.generation.max_tokens,
        generation_timeout = config.generation.timeout_secs,
        results_dir = config.output.results_dir.display(),
    );

    // Never write a file that would not load back
    Config::from_toml(&toml_content).context("Generated configuration is invalid")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml_content)?;
    println!("Created configuration at {}", path.display());
    Ok(())
}
