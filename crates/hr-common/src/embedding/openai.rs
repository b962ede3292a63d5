//! OpenAI-compatible embeddings client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Embedder, EmbeddingError};
use crate::http_client::LazyClient;

/// Blocking client for `/embeddings` endpoints (OpenAI or a compatible local server).
///
/// Performs exactly one HTTP request per call. Retrying is left to callers so a slow
/// backend surfaces as a timeout instead of being hidden behind a retry loop.
pub struct OpenAiEmbedder {
    client: LazyClient,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::Config("missing OpenAI API key".into()));
        }
        if model.trim().is_empty() {
            return Err(EmbeddingError::Config("missing embedding model name".into()));
        }

        let client = LazyClient::bearer(&api_key, timeout).map_err(EmbeddingError::Config)?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
            dimension: dimension.max(1),
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: Some(self.dimension),
        };
        let client = self.client.get().map_err(EmbeddingError::Config)?;
        let resp = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    EmbeddingError::Timeout(self.client.timeout())
                } else {
                    EmbeddingError::Request(err.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Request(format!(
                "embeddings endpoint returned {status}: {text}"
            )));
        }

        let mut parsed: EmbeddingResponse = resp
            .json()
            .map_err(|err| EmbeddingError::InvalidResponse(err.to_string()))?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != inputs.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "{} embeddings for {} inputs",
                parsed.data.len(),
                inputs.len()
            )));
        }

        parsed
            .data
            .into_iter()
            .map(|entry| {
                if entry.embedding.len() == self.dimension {
                    Ok(entry.embedding)
                } else {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: entry.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn version(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request(&[text])?
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding list".into()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.request(&inputs)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}
