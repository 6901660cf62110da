//! Hash-based pseudo-embeddings.

use super::{AsyncEmbedder, DEFAULT_DIMENSIONS, Embedder, EmbeddingProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic embedder that hashes words into a fixed-size vector.
///
/// Needs no model or network, so it is the default provider for local
/// stores and tests. Identical texts always produce identical vectors, and
/// texts sharing many words land close together. It does NOT capture
/// meaning: "sleep" and "rest" are unrelated to it.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Creates an embedder with [`DEFAULT_DIMENSIONS`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    /// Creates an embedder with custom dimensions.
    #[must_use]
    pub const fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn pseudo_embed(&self, text: &str) -> Vec<f32> {
        // Bounds work on very long inputs.
        const MAX_WORDS: usize = 1000;
        let mut embedding = vec![0.0f32; self.dimensions];

        for word in text.split_whitespace().take(MAX_WORDS) {
            let normalized: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if normalized.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            normalized.hash(&mut hasher);
            Self::distribute_hash(&mut embedding, hasher.finish());
        }

        Self::normalize_embedding(&mut embedding);
        embedding
    }

    /// Spreads a word hash over a few dimensions with signed weights.
    fn distribute_hash(embedding: &mut [f32], hash: u64) {
        let dimensions = embedding.len();
        for j in 0..4 {
            let idx = (hash >> (j * 16)) as usize % dimensions;
            let value = ((hash >> (j * 8 + 4)) & 0xFF) as f32 / 255.0 - 0.5;
            embedding[idx] += value;
        }
    }

    fn normalize_embedding(embedding: &mut [f32]) {
        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq <= 0.0 {
            return;
        }
        let inv_norm = norm_sq.sqrt().recip();
        for v in embedding.iter_mut() {
            *v *= inv_norm;
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(Error::InvalidInput(
                "Hash embedder needs at least one dimension".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
        }
        Ok(self.pseudo_embed(text))
    }
}

#[async_trait]
impl AsyncEmbedder for HashEmbedder {
    async fn embed_async(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text)
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }
}
