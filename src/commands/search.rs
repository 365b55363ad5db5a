use super::Workspace;
use anyhow::{Context, Result};
use reviewlens::{
    config::Config,
    retrieval::RankedDocument,
    types::RetrievalMode,
    util::truncate_for_display,
};
use tracing::info;

pub async fn search_corpus(
    config: Config,
    query: String,
    top_k: Option<usize>,
    mode: Option<RetrievalMode>,
    format: String,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let modes = match mode {
        Some(mode) => vec![mode],
        None => RetrievalMode::ALL.to_vec(),
    };
    info!("Searching for: {}", query);

    // Retrieval embeds the query synchronously, so the whole search runs on
    // the blocking pool
    let results = tokio::task::spawn_blocking(move || -> Result<Vec<(RetrievalMode, Vec<RankedDocument>)>> {
        let workspace = Workspace::load(&config, false)?;
        let retrievers = workspace.retrievers(&config)?;
        modes
            .into_iter()
            .map(|mode| Ok((mode, retrievers.retrieve(mode, &query, top_k)?)))
            .collect()
    })
    .await
    .context("Search task failed")??;

    output_search_results(&results, &format);
    Ok(())
}

fn output_search_results(results: &[(RetrievalMode, Vec<RankedDocument>)], format: &str) {
    match format {
        "json" | "json-pretty" => {
            let response: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .map(|(mode, ranked)| {
                    let documents: Vec<serde_json::Value> = ranked
                        .iter()
                        .map(|r| {
                            serde_json::json!({
                                "row": r.document.row,
                                "score": r.score,
                                "text": r.document.text,
                            })
                        })
                        .collect();
                    (mode.to_string(), serde_json::Value::Array(documents))
                })
                .collect();

            let serialized = if format == "json-pretty" {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match serialized {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize results: {}", e),
            }
        }
        _ => {
            for (mode, ranked) in results {
                println!("\n{} search results ({}):", capitalize(mode.as_str()), ranked.len());
                if ranked.is_empty() {
                    println!("  (no matches)");
                }
                for (i, r) in ranked.iter().enumerate() {
                    println!(
                        "  {}. [Score: {:.4}] [Row {}] {}",
                        i + 1,
                        r.score,
                        r.document.row,
                        truncate_for_display(&r.document.text, 200),
                    );
                }
            }
            println!();
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
