//! FastEmbed-based embedder.
//!
//! Provides local semantic embeddings using the all-MiniLM-L6-v2 model via
//! fastembed-rs. Requires the `fastembed-embeddings` feature; without it the
//! type cannot be constructed and [`FastEmbedEmbedder::try_new`] reports why.

use super::{AsyncEmbedder, DEFAULT_DIMENSIONS, Embedder, EmbeddingProvider};
use crate::{Error, Result};

// ============================================================================
// Native FastEmbed Implementation (with feature)
// ============================================================================

#[cfg(feature = "fastembed-embeddings")]
mod native {
    use super::{AsyncEmbedder, DEFAULT_DIMENSIONS, Embedder, EmbeddingProvider, Error, Result};
    use async_trait::async_trait;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Mutex, OnceLock};
    use std::time::Instant;

    /// Lazily loaded model shared by every embedder instance.
    static EMBEDDING_MODEL: OnceLock<Mutex<fastembed::TextEmbedding>> = OnceLock::new();

    /// `FastEmbed` embedder using all-MiniLM-L6-v2.
    ///
    /// The model is loaded on the first embed call.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FastEmbedEmbedder;

    impl FastEmbedEmbedder {
        /// Default embedding dimensions for all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Creates a new `FastEmbed` embedder.
        ///
        /// # Errors
        ///
        /// Never fails when the feature is enabled.
        pub const fn try_new() -> Result<Self> {
            Ok(Self)
        }

        fn model() -> Result<&'static Mutex<fastembed::TextEmbedding>> {
            if let Some(model) = EMBEDDING_MODEL.get() {
                return Ok(model);
            }

            tracing::info!("Loading embedding model (first use)...");
            let start = Instant::now();

            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            let model = fastembed::TextEmbedding::try_new(options)
                .map_err(|e| Error::embedding("load_embedding_model", e))?;

            tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                model = "all-MiniLM-L6-v2",
                "Embedding model loaded"
            );

            // Another thread may have won the race; either model is fine.
            let _ = EMBEDDING_MODEL.set(Mutex::new(model));
            EMBEDDING_MODEL.get().ok_or_else(|| {
                Error::embedding("get_embedding_model", "Model initialization race condition")
            })
        }

        fn run(texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            if texts.iter().any(String::is_empty) {
                return Err(Error::InvalidInput("Cannot embed empty text".to_string()));
            }
            let model = Self::model()?;
            let batch_size = texts.len();

            // ONNX runtime can panic on malformed inputs.
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut guard = model
                    .lock()
                    .map_err(|e| Error::embedding("embed", e.to_string()))?;
                guard
                    .embed(texts, None)
                    .map_err(|e| Error::embedding("embed", e))
            }));

            result.map_err(|panic_info| {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(
                    panic_message = %panic_msg,
                    batch_size,
                    "ONNX runtime panicked during embedding"
                );
                Error::embedding("embed", format!("ONNX runtime panic: {panic_msg}"))
            })?
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            Self::DEFAULT_DIMENSIONS
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Self::run(vec![text.to_string()])?
                .into_iter()
                .next()
                .ok_or_else(|| Error::embedding("embed", "No embedding returned from model"))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            Self::run(texts.iter().map(|s| (*s).to_string()).collect())
        }
    }

    #[async_trait]
    impl AsyncEmbedder for FastEmbedEmbedder {
        async fn embed_async(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_string();
            tokio::task::spawn_blocking(move || Self.embed(&text))
                .await
                .map_err(|e| Error::embedding("embed_async", e))?
        }
    }

    impl EmbeddingProvider for FastEmbedEmbedder {
        fn name(&self) -> &'static str {
            "fastembed"
        }
    }
}

// ============================================================================
// Disabled Implementation (without feature)
// ============================================================================

#[cfg(not(feature = "fastembed-embeddings"))]
mod disabled {
    use super::{AsyncEmbedder, DEFAULT_DIMENSIONS, Embedder, EmbeddingProvider, Error, Result};
    use async_trait::async_trait;
    use std::convert::Infallible;

    /// Placeholder for the `FastEmbed` embedder.
    ///
    /// Uninhabited: the only constructor fails until the
    /// `fastembed-embeddings` feature is compiled in.
    #[derive(Debug)]
    pub struct FastEmbedEmbedder {
        never: Infallible,
    }

    impl FastEmbedEmbedder {
        /// Default embedding dimensions for all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Always fails without the `fastembed-embeddings` feature.
        ///
        /// # Errors
        ///
        /// Returns [`Error::InvalidConfig`].
        pub fn try_new() -> Result<Self> {
            Err(Error::InvalidConfig(
                "embedding provider 'fastembed' requires the fastembed-embeddings feature"
                    .to_string(),
            ))
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            match self.never {}
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            match self.never {}
        }
    }

    #[async_trait]
    impl AsyncEmbedder for FastEmbedEmbedder {
        async fn embed_async(&self, _text: &str) -> Result<Vec<f32>> {
            match self.never {}
        }
    }

    impl EmbeddingProvider for FastEmbedEmbedder {
        fn name(&self) -> &'static str {
            match self.never {}
        }
    }
}

// ============================================================================
// Public Re-exports
// ============================================================================

#[cfg(feature = "fastembed-embeddings")]
pub use native::FastEmbedEmbedder;

#[cfg(not(feature = "fastembed-embeddings"))]
pub use disabled::FastEmbedEmbedder;
