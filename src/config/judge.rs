//! Relevance judge and text generation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds on the judge's self-correction loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Total generation calls allowed per document (initial prompt + repairs)
    pub max_attempts: usize,
    /// Deadline for a single generation call; unbounded when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            timeout_secs: Some(120),
        }
    }
}

impl JudgeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_generation_timeout() -> u64 {
    120
}

/// OpenAI-compatible chat completion endpoint used as the judge oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API endpoint URL (e.g., "https://api.openai.com/v1/chat/completions")
    pub endpoint: String,
    /// API key (optional, can also use OPENAI_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,
    /// Maximum tokens generated per call
    pub max_tokens: u32,
    /// HTTP request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            timeout_secs: default_generation_timeout(),
        }
    }
}
