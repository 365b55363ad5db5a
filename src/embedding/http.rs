//! HTTP embedding backend for OpenAI-compatible `/v1/embeddings` APIs

use super::normalize;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use crate::util::retry_after_ms;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings for [`HttpEmbedder`]
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
    pub max_batch_size: usize,
}

/// Embeds text through an OpenAI-compatible HTTP API
#[derive(Debug)]
pub struct HttpEmbedder {
    client: Client,
    config: HttpEmbedderConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> EmbeddingResult<Self> {
        info!(
            "Initializing HTTP embedding backend: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());

        match &api_key {
            Some(key) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| EmbeddingError::Config(format!("Invalid API key format: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
            None if config.endpoint.contains("openai.com") => {
                warn!("No API key provided for {}", config.endpoint);
            }
            None => {}
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn request(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            // Only text-embedding-3-* models accept a dimensions override
            dimensions: self
                .config
                .model
                .contains("text-embedding-3")
                .then_some(self.config.dimensions),
            encoding_format: "float",
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Failed to serialize request: {}", e)))?;

        debug!(
            "Sending embedding request to {} for {} texts",
            self.config.endpoint,
            texts.len()
        );

        // reqwest's blocking client panics inside a tokio runtime, so the call
        // runs on its own scoped thread.
        let response = std::thread::scope(|s| {
            s.spawn(|| self.client.post(&self.config.endpoint).body(body).send())
                .join()
        })
        .map_err(|_| EmbeddingError::EmbeddingFailed("HTTP request thread panicked".to_string()))??;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = retry_after_ms(response.headers());
            return Err(EmbeddingError::RateLimited { retry_after_ms });
        }

        if !status.is_success() {
            let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "API error ({}): {}",
                status, message
            )));
        }

        let mut data = response.json::<EmbeddingResponse>()?.data;
        if data.len() != texts.len() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                if d.embedding.len() != self.config.dimensions {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.config.dimensions,
                        actual: d.embedding.len(),
                    });
                }
                Ok(normalize(d.embedding))
            })
            .collect()
    }
}

impl EmbeddingBackend for HttpEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        self.request(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding returned".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in refs.chunks(self.config.max_batch_size.max(1)) {
            embeddings.extend(self.request(batch)?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HttpEmbedderConfig {
        HttpEmbedderConfig {
            endpoint: "http://localhost:8080/v1/embeddings".to_string(),
            api_key: Some("test-key".to_string()),
            model: "bge-small-en-v1.5".to_string(),
            dimensions: 384,
            timeout_secs: 5,
            max_batch_size: 16,
        }
    }

    #[test]
    fn builds_without_network() {
        let embedder = HttpEmbedder::new(config()).unwrap();
        assert_eq!(embedder.name(), "http");
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn empty_batch_makes_no_request() {
        let embedder = HttpEmbedder::new(config()).unwrap();
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn request_omits_dimensions_for_other_models() {
        let texts = ["hello"];
        let request = EmbeddingRequest {
            model: "bge-small-en-v1.5",
            input: &texts,
            dimensions: None,
            encoding_format: "float",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("dimensions").is_none());
        assert_eq!(json["input"][0], "hello");
    }
}
