//! Vector store traits.
//!
//! A vector store holds documents with their embeddings and answers two
//! questions about a query embedding: which documents are nearest, and which
//! nearest documents are also mutually diverse (max marginal relevance).
//!
//! # Available Implementations
//!
//! | Store | Use Case | Configuration |
//! |-------|----------|---------------|
//! | `MemoryVectorStore` | Local brute-force store | Optional JSON persist path |
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use factsieve::models::MmrRequest;
//! use factsieve::storage::{MemoryVectorStore, VectorStore};
//!
//! let store = MemoryVectorStore::new(384);
//! store.add_texts(&["Honey never spoils."], &embedder)?;
//!
//! let query = embedder.embed("What lasts forever?")?;
//! for doc in store.max_marginal_relevance_search_by_vector(&query, MmrRequest::new(5, 20, 0.5))? {
//!     println!("{}", doc.page_content);
//! }
//! ```

use crate::Result;
use crate::models::{Document, MmrRequest, ScoredDocument};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for blocking vector stores.
///
/// Implementations should be thread-safe (`Send + Sync`) and use `&self`
/// so a store can be shared via `Arc`.
///
/// # Dimensionality
///
/// Query embeddings must match the store's [`dimensions()`](VectorStore::dimensions).
pub trait VectorStore: Send + Sync {
    /// The dimensionality of stored embeddings.
    fn dimensions(&self) -> usize;

    /// Returns the number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn len(&self) -> Result<usize>;

    /// Returns true if the store holds no documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns up to `k` documents ordered by descending cosine similarity.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>>;

    /// Returns up to `request.k` documents chosen by max marginal relevance
    /// from the `request.fetch_k` nearest, in selection order.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn max_marginal_relevance_search_by_vector(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>>;
}

/// Trait for vector stores searched without blocking the caller.
#[async_trait]
pub trait AsyncVectorStore: Send + Sync {
    /// Suspending variant of [`VectorStore::similarity_search_by_vector`].
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    async fn similarity_search_by_vector_async(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>>;

    /// Suspending variant of [`VectorStore::max_marginal_relevance_search_by_vector`].
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    async fn max_marginal_relevance_search_by_vector_async(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>>;
}

impl<T: VectorStore + ?Sized> VectorStore for Arc<T> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }

    fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        (**self).similarity_search_by_vector(embedding, k)
    }

    fn max_marginal_relevance_search_by_vector(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>> {
        (**self).max_marginal_relevance_search_by_vector(embedding, request)
    }
}

#[async_trait]
impl<T: AsyncVectorStore + ?Sized> AsyncVectorStore for Arc<T> {
    async fn similarity_search_by_vector_async(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        (**self).similarity_search_by_vector_async(embedding, k).await
    }

    async fn max_marginal_relevance_search_by_vector_async(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>> {
        (**self)
            .max_marginal_relevance_search_by_vector_async(embedding, request)
            .await
    }
}
