//! Embedding generation.
//!
//! Two capability traits describe an embedding provider: [`Embedder`] blocks
//! the calling thread, [`AsyncEmbedder`] suspends. Concrete providers
//! implement both so a retriever can be driven either way.

// Allow cast precision loss for hash-based embedding calculations.
#![allow(clippy::cast_precision_loss)]
// Allow cast possible truncation for hash index calculations on 32-bit platforms.
#![allow(clippy::cast_possible_truncation)]

mod fastembed;
mod hashed;
mod openai;

pub use fastembed::FastEmbedEmbedder;
pub use hashed::HashEmbedder;
pub use openai::OpenAiEmbedder;

use crate::Result;
use crate::config::{EmbeddingProviderKind, EmbeddingSettings};
use async_trait::async_trait;
use std::sync::Arc;

/// Default embedding dimensions for all-MiniLM-L6-v2.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Trait for blocking embedding generators.
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Trait for non-blocking embedding generators.
#[async_trait]
pub trait AsyncEmbedder: Send + Sync {
    /// Generates an embedding for the given text without blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    async fn embed_async(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts, one call at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    async fn embed_batch_async(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_async(text).await?);
        }
        Ok(out)
    }
}

/// A provider usable from both blocking and suspending code.
pub trait EmbeddingProvider: Embedder + AsyncEmbedder {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }
}

#[async_trait]
impl<T: AsyncEmbedder + ?Sized> AsyncEmbedder for Arc<T> {
    async fn embed_async(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_async(text).await
    }

    async fn embed_batch_async(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch_async(texts).await
    }
}

/// Builds the embedding provider selected by the settings.
///
/// # Errors
///
/// Returns an error if the provider cannot be constructed (for example
/// `fastembed` without the `fastembed-embeddings` feature).
pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match settings.provider {
        EmbeddingProviderKind::Hash => Arc::new(HashEmbedder::with_dimensions(
            settings.dimensions.unwrap_or(DEFAULT_DIMENSIONS),
        )),
        EmbeddingProviderKind::OpenAi => {
            let mut client = OpenAiEmbedder::new();
            if let Some(key) = &settings.api_key {
                client = client.with_api_key(key.clone());
            }
            if let Some(url) = &settings.base_url {
                client = client.with_endpoint(url);
            }
            if let Some(model) = &settings.model {
                client = client.with_model(model);
            }
            if let Some(dimensions) = settings.dimensions {
                client = client.with_dimensions(dimensions);
            }
            Arc::new(client)
        },
        EmbeddingProviderKind::FastEmbed => Arc::new(FastEmbedEmbedder::try_new()?),
    };

    tracing::debug!(
        provider = provider.name(),
        dimensions = provider.dimensions(),
        "Built embedding provider"
    );
    Ok(provider)
}

/// Computes cosine similarity between two embedding vectors.
///
/// Returns the dot product divided by the product of the Euclidean norms, in
/// `[-1.0, 1.0]`. Returns 0.0 when either vector has zero norm, when the
/// lengths differ, or when the vectors are empty.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
