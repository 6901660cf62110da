//! `OpenAI` embeddings client.

use super::{AsyncEmbedder, Embedder, EmbeddingProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::instrument;

/// `OpenAI` `/embeddings` client.
///
/// The blocking client is created on first blocking call so the embedder can
/// be constructed inside an async runtime.
pub struct OpenAiEmbedder {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Embedding model.
    model: String,
    /// Vector size the model produces.
    dimensions: usize,
    /// Vector size requested from the API, when overridden.
    requested_dimensions: Option<usize>,
    /// Async HTTP client.
    client: reqwest::Client,
    /// Blocking HTTP client.
    blocking: OnceLock<reqwest::blocking::Client>,
}

impl OpenAiEmbedder {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-3-small";

    /// Dimensions of [`Self::DEFAULT_MODEL`].
    pub const DEFAULT_DIMENSIONS: usize = 1536;

    /// Creates a client reading `OPENAI_API_KEY` from the environment.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            dimensions: Self::DEFAULT_DIMENSIONS,
            requested_dimensions: None,
            client: reqwest::Client::new(),
            blocking: OnceLock::new(),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the vector size and asks the API to shorten embeddings to it.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self.requested_dimensions = Some(dimensions);
        self
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| Error::embedding("openai_request", "OPENAI_API_KEY not set"))
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.endpoint)
    }

    fn request<'a>(&'a self, input: &'a [&'a str]) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.model,
            input,
            dimensions: self.requested_dimensions,
        }
    }

    /// Orders the response rows by index and checks their count and size.
    fn into_vectors(
        response: EmbeddingResponse,
        expected: usize,
        dimensions: usize,
    ) -> Result<Vec<Vec<f32>>> {
        let mut data = response.data;
        if data.len() != expected {
            return Err(Error::embedding(
                "openai_response",
                format!("expected {expected} embeddings, got {}", data.len()),
            ));
        }
        if let Some(row) = data.iter().find(|row| row.embedding.len() != dimensions) {
            return Err(Error::embedding(
                "openai_response",
                format!(
                    "expected {dimensions}-dimensional embeddings, got {}",
                    row.embedding.len()
                ),
            ));
        }
        data.sort_by_key(|row| row.index);
        Ok(data.into_iter().map(|row| row.embedding).collect())
    }

    fn first(mut vectors: Vec<Vec<f32>>) -> Result<Vec<f32>> {
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("openai_response", "No embedding returned"))
    }
}

impl Default for OpenAiEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Self::first(self.embed_batch(&[text])?)
    }

    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self.api_key()?;
        let client = self.blocking.get_or_init(reqwest::blocking::Client::new);

        let response = client
            .post(self.url())
            .bearer_auth(api_key)
            .json(&self.request(texts))
            .send()
            .map_err(|e| Error::embedding("openai_request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::embedding(
                "openai_request",
                format!("API returned status: {status} - {body}"),
            ));
        }

        let response: EmbeddingResponse = response
            .json()
            .map_err(|e| Error::embedding("openai_response", e))?;
        Self::into_vectors(response, texts.len(), self.dimensions)
    }
}

#[async_trait]
impl AsyncEmbedder for OpenAiEmbedder {
    async fn embed_async(&self, text: &str) -> Result<Vec<f32>> {
        Self::first(self.embed_batch_async(&[text]).await?)
    }

    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch_async(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(self.url())
            .bearer_auth(api_key)
            .json(&self.request(texts))
            .send()
            .await
            .map_err(|e| Error::embedding("openai_request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(
                "openai_request",
                format!("API returned status: {status} - {body}"),
            ));
        }

        let response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding("openai_response", e))?;
        Self::into_vectors(response, texts.len(), self.dimensions)
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let client = OpenAiEmbedder::new()
            .with_api_key(SecretString::from("sk-test".to_string()))
            .with_endpoint("http://localhost:8080/v1/")
            .with_model("text-embedding-3-large")
            .with_dimensions(3072);
        assert_eq!(client.url(), "http://localhost:8080/v1/embeddings");
        assert_eq!(client.model(), "text-embedding-3-large");
        assert_eq!(client.dimensions(), 3072);
        assert_eq!(client.api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_request_serialization() {
        let client = OpenAiEmbedder::new();
        let texts = ["a", "b"];
        let json = serde_json::to_value(client.request(&texts)).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"], serde_json::json!(["a", "b"]));
        assert!(json.get("dimensions").is_none());

        let shortened = OpenAiEmbedder::new().with_dimensions(256);
        let json = serde_json::to_value(shortened.request(&texts)).unwrap();
        assert_eq!(json["dimensions"], 256);
    }

    #[test]
    fn test_response_reordered_by_index() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#,
        )
        .unwrap();
        let vectors = OpenAiEmbedder::into_vectors(response, 2, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_response_count_mismatch() {
        let response = EmbeddingResponse { data: Vec::new() };
        let err = OpenAiEmbedder::into_vectors(response, 1, 2).unwrap_err();
        assert_eq!(err.origin(), crate::ErrorOrigin::Embedding);
    }

    #[test]
    fn test_response_dimension_mismatch() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0,0.0,0.0]}]}"#).unwrap();
        let err = OpenAiEmbedder::into_vectors(response, 1, 2).unwrap_err();
        assert_eq!(err.origin(), crate::ErrorOrigin::Embedding);
    }

    #[test]
    fn test_empty_batch_skips_request() {
        let client = OpenAiEmbedder::new().with_endpoint("http://127.0.0.1:9");
        assert!(client.embed_batch(&[]).unwrap().is_empty());
    }
}
