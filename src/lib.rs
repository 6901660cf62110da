//! # Factsieve
//!
//! Diversity-aware document retrieval with near-duplicate filtering.
//!
//! Factsieve sits between a question and a vector store. It asks the store for
//! a max-marginal-relevance ranked candidate set, then walks that set in order
//! and drops every candidate whose embedding is too close to one it already
//! accepted.
//!
//! ## Features
//!
//! - One retrieval algorithm, driven by blocking or suspending collaborators
//! - Pluggable embedding providers (hash pseudo-embeddings, `OpenAI`, `FastEmbed`)
//! - In-memory vector store with MMR search and JSON persistence
//! - Text loading and chunking for building a store from plain files
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use factsieve::embedding::{Embedder, HashEmbedder};
//! use factsieve::retrieval::{FilterConfig, RedundantFilterRetriever, Retriever};
//! use factsieve::storage::MemoryVectorStore;
//!
//! let embedder = Arc::new(HashEmbedder::new());
//! let store = Arc::new(MemoryVectorStore::new(embedder.dimensions()));
//! store.add_texts(&["Honey never spoils.", "Octopuses have three hearts."], embedder.as_ref())?;
//!
//! let retriever = RedundantFilterRetriever::new(store, embedder, FilterConfig::default())?;
//! let docs = retriever.retrieve("Tell me about honey")?;
//! assert!(docs.len() <= 5);
//! # Ok::<(), factsieve::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod retrieval;
pub mod storage;

// Re-exports for convenience
pub use config::SieveConfig;
pub use embedding::{AsyncEmbedder, Embedder};
pub use models::Document;
pub use retrieval::{AsyncRetriever, FilterConfig, RedundantFilterRetriever, Retriever};
pub use storage::{AsyncVectorStore, MemoryVectorStore, VectorStore};

/// Error type for factsieve operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidConfig` | Threshold or lambda outside `[0, 1]`, `fetch_k < k`, bad splitter sizes |
/// | `InvalidInput` | Embedding dimension mismatch, empty text for strict embedders |
/// | `Embedding` | The embedding provider failed or returned an unusable response |
/// | `Search` | The vector store failed while searching |
/// | `OperationFailed` | Local I/O, config parsing, store persistence, logging setup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration was rejected before any query ran.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding provider failed.
    #[error("embedding '{operation}' failed: {cause}")]
    Embedding {
        /// The provider operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The vector search backend failed.
    #[error("search '{operation}' failed: {cause}")]
    Search {
        /// The backend operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A local operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Where an [`Error`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// The embedding provider.
    Embedding,
    /// The vector search backend.
    Search,
    /// Construction-time configuration checks.
    Configuration,
    /// Caller-supplied input.
    Input,
    /// Local I/O and setup.
    Local,
}

impl Error {
    /// Returns the origin of this error.
    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::InvalidConfig(_) => ErrorOrigin::Configuration,
            Self::InvalidInput(_) => ErrorOrigin::Input,
            Self::Embedding { .. } => ErrorOrigin::Embedding,
            Self::Search { .. } => ErrorOrigin::Search,
            Self::OperationFailed { .. } => ErrorOrigin::Local,
        }
    }

    pub(crate) fn embedding(operation: &str, cause: impl ToString) -> Self {
        Self::Embedding {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn search(operation: &str, cause: impl ToString) -> Self {
        Self::Search {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn failed(operation: &str, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for factsieve operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfig("threshold 1.5 is outside [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: threshold 1.5 is outside [0, 1]"
        );

        let err = Error::embedding("embed_query", "connection refused");
        assert_eq!(
            err.to_string(),
            "embedding 'embed_query' failed: connection refused"
        );

        let err = Error::search("mmr_search", "lock poisoned");
        assert_eq!(err.to_string(), "search 'mmr_search' failed: lock poisoned");
    }

    #[test]
    fn test_error_origin() {
        assert_eq!(
            Error::embedding("embed", "x").origin(),
            ErrorOrigin::Embedding
        );
        assert_eq!(Error::search("search", "x").origin(), ErrorOrigin::Search);
        assert_eq!(
            Error::InvalidConfig(String::new()).origin(),
            ErrorOrigin::Configuration
        );
        assert_eq!(
            Error::InvalidInput(String::new()).origin(),
            ErrorOrigin::Input
        );
        assert_eq!(Error::failed("read", "x").origin(), ErrorOrigin::Local);
    }
}
