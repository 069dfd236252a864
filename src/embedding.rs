//! Embedding provider abstraction and the OpenAI implementation.
//!
//! Defines the [`EmbeddingProvider`] trait and [`OpenAIEmbedder`], which
//! calls the OpenAI embeddings API. The same provider instance embeds the
//! corpus at startup and each query at request time, so both sides share
//! one model and dimensionality.
//!
//! Also provides [`squared_l2_distance`], the ranking metric used by the
//! index.
//!
//! There is no retry: a failed call fails the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::EmbeddingConfig;
use crate::error::EmbeddingServiceError;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-ada-002"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingServiceError>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        self.embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingServiceError::InvalidResponse("empty embedding response".into()))
    }
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST {base_url}/embeddings` with the configured model.
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: usize,
    base_url: String,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder from configuration and an API key.
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self, EmbeddingServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingServiceError::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let json: serde_json::Value = response.json().await?;
        parse_openai_response(json, texts.len())
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Parse the OpenAI embeddings API response JSON.
///
/// Returns the `data[].embedding` arrays ordered by `data[].index`.
fn parse_openai_response(
    json: serde_json::Value,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
    let mut parsed: EmbeddingResponse = serde_json::from_value(json)
        .map_err(|e| EmbeddingServiceError::InvalidResponse(e.to_string()))?;

    if parsed.data.len() != expected {
        return Err(EmbeddingServiceError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            parsed.data.len()
        )));
    }

    if parsed.data.iter().all(|item| item.index.is_some()) {
        parsed.data.sort_by_key(|item| item.index);
    }

    Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
}

/// Squared Euclidean distance between two vectors.
///
/// Lengths must match; the index checks this before calling.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_orders_by_index() {
        let json = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vecs = parse_openai_response(json, 2).unwrap();
        assert_eq!(vecs, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_count_mismatch() {
        let json = json!({ "data": [ { "index": 0, "embedding": [1.0] } ] });
        let err = parse_openai_response(json, 2).unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings"));
    }

    #[test]
    fn test_parse_missing_data() {
        let err = parse_openai_response(json!({ "error": "nope" }), 1).unwrap_err();
        assert!(matches!(err, EmbeddingServiceError::InvalidResponse(_)));
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2_distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert!((squared_l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 25.0).abs() < 1e-6);
    }
}
