//! Retriever capability traits and the redundancy-filtering retriever.

use super::{FilterConfig, RedundancyGate, Verdict};
use crate::Result;
use crate::embedding::{AsyncEmbedder, Embedder};
use crate::models::Document;
use crate::storage::{AsyncVectorStore, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// A function from a query to a ranked sequence of documents.
pub trait Retriever: Send + Sync {
    /// Retrieves documents for `query`, blocking until done.
    ///
    /// # Errors
    ///
    /// Returns an error if any collaborator fails. No partial results.
    fn retrieve(&self, query: &str) -> Result<Vec<Document>>;
}

/// Suspending counterpart of [`Retriever`].
#[async_trait]
pub trait AsyncRetriever: Send + Sync {
    /// Retrieves documents for `query` without blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if any collaborator fails. No partial results.
    async fn retrieve_async(&self, query: &str) -> Result<Vec<Document>>;
}

/// Retriever that runs an MMR search and then drops near-duplicates.
///
/// # How it works
///
/// 1. Embeds the query (one embedder call)
/// 2. Requests `k` documents from the store's MMR search over `fetch_k` candidates
/// 3. Embeds each candidate in store order (one embedder call per candidate)
/// 4. Drops a candidate when its cosine similarity to any accepted candidate
///    is at least `threshold`
/// 5. Stops once `k` candidates are accepted, even if the store returned more
///
/// Holds no state between calls; each call owns its accepted list.
/// Collaborator errors are returned unchanged and abort the call.
///
/// # Example
///
/// ```rust,ignore
/// use factsieve::retrieval::{FilterConfig, RedundantFilterRetriever, Retriever};
///
/// let retriever = RedundantFilterRetriever::new(store, embedder, FilterConfig::default())?;
/// for doc in retriever.retrieve("What is an interesting fact about English?")? {
///     println!("{}", doc.page_content);
/// }
/// ```
pub struct RedundantFilterRetriever<S: ?Sized, E: ?Sized> {
    /// Vector store searched with MMR.
    store: Arc<S>,
    /// Embedder for the query and every candidate.
    embedder: Arc<E>,
    /// Validated, immutable configuration.
    config: FilterConfig,
}

impl<S: ?Sized, E: ?Sized> RedundantFilterRetriever<S, E> {
    /// Creates a retriever after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the
    /// configuration violates its bounds. No collaborator is called.
    pub fn new(store: Arc<S>, embedder: Arc<E>, config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            embedder,
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns the vector store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the embedder.
    #[must_use]
    pub const fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    fn gate(&self) -> RedundancyGate<Document> {
        RedundancyGate::new(self.config.threshold, self.config.k)
    }

    /// Offers one candidate; returns false once the gate is full.
    fn admit(gate: &mut RedundancyGate<Document>, candidate: Document, embedding: Vec<f32>) -> bool {
        match gate.offer(candidate, embedding) {
            Verdict::Accepted => true,
            Verdict::Redundant {
                matched,
                similarity,
            } => {
                tracing::debug!(
                    matched,
                    similarity,
                    "Discarded candidate as redundant"
                );
                metrics::counter!("retrieval_candidates_discarded_total").increment(1);
                true
            },
            Verdict::Full => false,
        }
    }

    fn finish(
        mode: &'static str,
        gate: RedundancyGate<Document>,
        fetched: usize,
        start: Instant,
    ) -> Vec<Document> {
        let accepted = gate.into_accepted();
        let duration_ms = start.elapsed().as_millis();

        tracing::debug!(
            fetched,
            returned = accepted.len(),
            duration_ms = %duration_ms,
            "Retrieval complete"
        );
        metrics::counter!("retrieval_requests_total", "mode" => mode).increment(1);
        #[allow(clippy::cast_precision_loss)]
        metrics::histogram!("retrieval_duration_ms", "mode" => mode).record(duration_ms as f64);

        accepted
    }
}

impl<S, E> Retriever for RedundantFilterRetriever<S, E>
where
    S: VectorStore + ?Sized,
    E: Embedder + ?Sized,
{
    #[instrument(
        skip(self, query),
        fields(operation = "retrieve", mode = "sync", query_length = query.len(), k = self.config.k)
    )]
    fn retrieve(&self, query: &str) -> Result<Vec<Document>> {
        let start = Instant::now();

        let query_embedding = self.embedder.embed(query)?;
        let candidates = self
            .store
            .max_marginal_relevance_search_by_vector(&query_embedding, self.config.mmr_request())?;
        let fetched = candidates.len();

        let mut gate = self.gate();
        for candidate in candidates {
            if gate.is_full() {
                break;
            }
            let embedding = self.embedder.embed(&candidate.page_content)?;
            if !Self::admit(&mut gate, candidate, embedding) {
                break;
            }
        }

        Ok(Self::finish("sync", gate, fetched, start))
    }
}

#[async_trait]
impl<S, E> AsyncRetriever for RedundantFilterRetriever<S, E>
where
    S: AsyncVectorStore + ?Sized,
    E: AsyncEmbedder + ?Sized,
{
    #[instrument(
        skip(self, query),
        fields(operation = "retrieve", mode = "async", query_length = query.len(), k = self.config.k)
    )]
    async fn retrieve_async(&self, query: &str) -> Result<Vec<Document>> {
        let start = Instant::now();

        let query_embedding = self.embedder.embed_async(query).await?;
        let candidates = self
            .store
            .max_marginal_relevance_search_by_vector_async(
                &query_embedding,
                self.config.mmr_request(),
            )
            .await?;
        let fetched = candidates.len();

        let mut gate = self.gate();
        for candidate in candidates {
            if gate.is_full() {
                break;
            }
            let embedding = self.embedder.embed_async(&candidate.page_content).await?;
            if !Self::admit(&mut gate, candidate, embedding) {
                break;
            }
        }

        Ok(Self::finish("async", gate, fetched, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::storage::MemoryVectorStore;
    use crate::{Error, ErrorOrigin};

    fn store_with(texts: &[&str], embedder: &HashEmbedder) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new(embedder.dimensions()));
        store.add_texts(texts, embedder).unwrap();
        store
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let embedder = Arc::new(HashEmbedder::new());
        let store = Arc::new(MemoryVectorStore::new(embedder.dimensions()));
        let result = RedundantFilterRetriever::new(
            store,
            embedder,
            FilterConfig::default().with_threshold(1.5),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let embedder = HashEmbedder::new();
        let store = store_with(
            &[
                "Honey never spoils",
                "Honey never spoils",
                "Honey never spoils",
            ],
            &embedder,
        );
        let retriever = RedundantFilterRetriever::new(
            store,
            Arc::new(embedder),
            FilterConfig::default().with_lambda_mult(1.0),
        )
        .unwrap();

        let docs = retriever.retrieve("honey").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "Honey never spoils");
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        let embedder = Arc::new(HashEmbedder::new());
        let store = Arc::new(MemoryVectorStore::new(embedder.dimensions()));
        let retriever =
            RedundantFilterRetriever::new(store, embedder, FilterConfig::default()).unwrap();
        assert!(retriever.retrieve("anything").unwrap().is_empty());
    }

    #[test]
    fn test_embedder_error_propagates() {
        let embedder = HashEmbedder::new();
        let store = store_with(&["Octopuses have three hearts"], &embedder);
        let retriever =
            RedundantFilterRetriever::new(store, Arc::new(embedder), FilterConfig::default())
                .unwrap();
        let err = retriever.retrieve("   ").unwrap_err();
        assert_eq!(err.origin(), ErrorOrigin::Input);
    }

    #[test]
    fn test_store_dimension_mismatch_is_search_error() {
        let embedder = Arc::new(HashEmbedder::with_dimensions(16));
        let store = Arc::new(MemoryVectorStore::new(32));
        let retriever =
            RedundantFilterRetriever::new(store, embedder, FilterConfig::default()).unwrap();
        let err = retriever.retrieve("query").unwrap_err();
        assert_eq!(err.origin(), ErrorOrigin::Search);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let embedder = HashEmbedder::new();
        let store = store_with(
            &[
                "The shortest war in history lasted 38 minutes",
                "The shortest war in history lasted 38 minutes only",
                "Bananas are berries but strawberries are not",
                "A group of flamingos is called a flamboyance",
            ],
            &embedder,
        );
        let retriever =
            RedundantFilterRetriever::new(store, Arc::new(embedder), FilterConfig::default())
                .unwrap();

        let blocking = retriever.retrieve("shortest war").unwrap();
        let suspending = retriever.retrieve_async("shortest war").await.unwrap();
        assert_eq!(blocking, suspending);
    }
}
