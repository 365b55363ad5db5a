//! Configuration for reviewlens

mod corpus;
mod embedding;
mod index;
mod judge;
mod logging;

pub use corpus::{CorpusConfig, OutputConfig};
pub use embedding::{BackendConfig, EmbeddingConfig};
pub use index::{IndexConfig, NormalizationKind, RetrievalConfig};
pub use judge::{GenerationConfig, JudgeConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects every problem and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Corpus
        if self.corpus.text_column.trim().is_empty() {
            errors.push("corpus text_column must not be empty".to_string());
        }

        // Embedding
        let dims = self.embedding.dimensions();
        if dims == 0 {
            errors.push("embedding dimensions must be positive".to_string());
        }
        if dims > 4096 {
            errors.push("embedding dimensions must be <= 4096".to_string());
        }
        if self.embedding.index_batch_size == 0 {
            errors.push("embedding index_batch_size must be positive".to_string());
        }
        if let BackendConfig::Http {
            endpoint,
            max_batch_size,
            ..
        } = &self.embedding.backend
        {
            if endpoint.trim().is_empty() {
                errors.push("embedding endpoint must not be empty".to_string());
            }
            if *max_batch_size == 0 {
                errors.push("embedding max_batch_size must be positive".to_string());
            }
        }

        // Index
        if self.index.data_dir.as_os_str().is_empty() {
            errors.push("index data_dir must not be empty".to_string());
        }
        if self.index.hnsw_m == 0 {
            errors.push("HNSW M parameter must be positive".to_string());
        }
        if self.index.hnsw_ef_construction == 0 {
            errors.push("ef_construction must be positive".to_string());
        }
        if self.index.hnsw_ef_search == 0 {
            errors.push("ef_search must be positive".to_string());
        }

        // Retrieval
        if self.retrieval.top_k == 0 {
            errors.push("top_k must be positive".to_string());
        }
        if self.retrieval.candidate_count == 0 {
            errors.push("candidate_count must be positive".to_string());
        }
        if self.retrieval.rrf_k == 0 {
            errors.push("rrf_k must be positive".to_string());
        }
        for (name, weight) in [
            ("weight_lexical", self.retrieval.weight_lexical),
            ("weight_semantic", self.retrieval.weight_semantic),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                errors.push(format!("{} must be a non-negative number, got {}", name, weight));
            }
        }

        // Judge
        if self.judge.max_attempts == 0 {
            errors.push("judge max_attempts must be at least 1".to_string());
        }
        if self.judge.timeout_secs == Some(0) {
            errors.push("judge timeout_secs must be positive when set".to_string());
        }

        // Generation
        if self.generation.endpoint.trim().is_empty() {
            errors.push("generation endpoint must not be empty".to_string());
        }
        if self.generation.model.trim().is_empty() {
            errors.push("generation model must not be empty".to_string());
        }
        if self.generation.max_tokens == 0 {
            errors.push("generation max_tokens must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(valid_config().validate().is_ok(), "default config should be valid");
    }

    #[test]
    fn validate_rejects_zero_embedding_dimensions() {
        let mut cfg = valid_config();
        cfg.embedding.backend = BackendConfig::Hash { dimensions: 0 };
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains("embedding dimensions must be positive"),
            "unexpected error message: {}",
            err
        );
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut cfg = valid_config();
        cfg.retrieval.weight_lexical = -0.1;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("weight_lexical must be a non-negative number"));
    }

    #[test]
    fn validate_rejects_nan_weight() {
        let mut cfg = valid_config();
        cfg.retrieval.weight_semantic = f32::NAN;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("weight_semantic"));
    }

    #[test]
    fn validate_accepts_weights_above_one() {
        let mut cfg = valid_config();
        cfg.retrieval.weight_lexical = 2.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut cfg = valid_config();
        cfg.judge.max_attempts = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts must be at least 1"));
    }

    #[test]
    fn validate_reports_all_errors_together() {
        let mut cfg = valid_config();
        cfg.retrieval.top_k = 0;
        cfg.index.hnsw_m = 0;
        cfg.generation.model = String::new();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("top_k must be positive"));
        assert!(msg.contains("HNSW M parameter must be positive"));
        assert!(msg.contains("generation model must not be empty"));
    }

    #[test]
    fn parses_http_embedding_backend() {
        let cfg = Config::from_toml(
            r#"
            [embedding]
            backend = "http"
            endpoint = "http://localhost:1234/v1/embeddings"
            model = "bge-small-en-v1.5"
            dimensions = 384

            [retrieval]
            top_k = 3
            candidate_count = 10
            weight_lexical = 0.3
            weight_semantic = 0.7
            rrf_k = 60
            normalization = "reciprocal_rank"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.embedding.dimensions(), 384);
        assert!(matches!(cfg.embedding.backend, BackendConfig::Http { timeout_secs: 30, .. }));
        assert_eq!(cfg.retrieval.top_k, 3);
        assert_eq!(cfg.retrieval.normalization, NormalizationKind::ReciprocalRank);
        assert!(cfg.retrieval.parallel_leaves);
        assert_eq!(cfg.judge, JudgeConfig::default());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.corpus.text_column, "review");
        assert_eq!(cfg.retrieval.weight_lexical, 0.5);
        assert_eq!(cfg.retrieval.weight_semantic, 0.5);
        assert_eq!(cfg.judge.max_attempts, 5);
    }
}
