//! In-memory vector store.
//!
//! Brute-force O(n) search over `(document, embedding)` rows, with optional
//! JSON persistence to a single file.

use super::maximal_marginal_relevance;
use crate::embedding::{AsyncEmbedder, Embedder, cosine_similarity};
use crate::models::{Document, DocumentId, MmrRequest, ScoredDocument};
use crate::storage::traits::{AsyncVectorStore, VectorStore};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

/// A stored document with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRow {
    id: DocumentId,
    document: Document,
    embedding: Vec<f32>,
}

/// Store data for serialization.
#[derive(Serialize, Deserialize)]
struct StoreData {
    dimensions: usize,
    rows: Vec<StoredRow>,
}

/// Brute-force vector store kept in memory.
///
/// Rows keep insertion order, which also breaks score ties. Use
/// [`save`](Self::save) to persist when a path is configured.
pub struct MemoryVectorStore {
    /// Path to the persisted JSON file (empty for in-memory only).
    path: PathBuf,
    /// Embedding dimensions.
    dimensions: usize,
    /// Stored rows.
    rows: RwLock<Vec<StoredRow>>,
}

impl MemoryVectorStore {
    /// Creates an empty in-memory store (no file persistence).
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self {
            path: PathBuf::new(),
            dimensions,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store bound to `path`, loading it when the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or if
    /// its dimensions differ from `dimensions`.
    pub fn open(path: impl Into<PathBuf>, dimensions: usize) -> Result<Self> {
        let store = Self {
            path: path.into(),
            dimensions,
            rows: RwLock::new(Vec::new()),
        };
        store.load()?;
        Ok(store)
    }

    /// Returns the persist path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        if self.path.as_os_str().is_empty() {
            None
        } else {
            Some(&self.path)
        }
    }

    /// Reads the store dimensions recorded in a persisted file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn peek_dimensions(path: &Path) -> Result<usize> {
        Ok(Self::read_file(path)?.dimensions)
    }

    fn read_file(path: &Path) -> Result<StoreData> {
        let content = fs::read_to_string(path).map_err(|e| Error::failed("load_store", e))?;
        serde_json::from_str(&content).map_err(|e| Error::failed("parse_store", e))
    }

    /// Loads rows from disk, replacing the current contents.
    ///
    /// Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or on a
    /// dimension mismatch.
    pub fn load(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let data = Self::read_file(path)?;
        if data.dimensions != self.dimensions {
            return Err(Error::InvalidInput(format!(
                "Store dimensions mismatch: expected {}, got {}",
                self.dimensions, data.dimensions
            )));
        }

        let count = data.rows.len();
        *self.write()? = data.rows;
        tracing::debug!(path = %path.display(), count, "Loaded vector store");
        Ok(())
    }

    /// Saves rows to disk. No-op for in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };

        let data = StoreData {
            dimensions: self.dimensions,
            rows: self.read()?.clone(),
        };
        let content = serde_json::to_string(&data).map_err(|e| Error::failed("serialize_store", e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::failed("create_store_dir", e))?;
        }
        fs::write(path, content).map_err(|e| Error::failed("write_store", e))?;

        tracing::debug!(path = %path.display(), count = data.rows.len(), "Saved vector store");
        Ok(())
    }

    /// Adds a document with a precomputed embedding.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding has the wrong dimensions.
    pub fn add_embedded(&self, document: Document, embedding: Vec<f32>) -> Result<DocumentId> {
        self.validate_embedding(&embedding)?;
        let mut rows = self.write()?;
        let id = DocumentId::new(format!("doc-{}", rows.len()));
        rows.push(StoredRow {
            id: id.clone(),
            document,
            embedding,
        });
        Ok(id)
    }

    /// Embeds and adds documents in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or returns the wrong dimensions.
    /// Nothing is added on error.
    #[instrument(skip(self, documents, embedder), fields(count = documents.len()))]
    pub fn add_documents<E: Embedder + ?Sized>(
        &self,
        documents: Vec<Document>,
        embedder: &E,
    ) -> Result<Vec<DocumentId>> {
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        self.insert_all(documents, embeddings)
    }

    /// Suspending variant of [`add_documents`](Self::add_documents).
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or returns the wrong dimensions.
    pub async fn add_documents_async<E: AsyncEmbedder + ?Sized>(
        &self,
        documents: Vec<Document>,
        embedder: &E,
    ) -> Result<Vec<DocumentId>> {
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        let embeddings = embedder.embed_batch_async(&texts).await?;
        self.insert_all(documents, embeddings)
    }

    /// Embeds and adds plain texts with empty metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails.
    pub fn add_texts<E: Embedder + ?Sized>(
        &self,
        texts: &[&str],
        embedder: &E,
    ) -> Result<Vec<DocumentId>> {
        self.add_documents(texts.iter().map(|t| Document::new(*t)).collect(), embedder)
    }

    /// Removes every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    fn insert_all(
        &self,
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<DocumentId>> {
        if embeddings.len() != documents.len() {
            return Err(Error::embedding(
                "embed_batch",
                format!(
                    "expected {} embeddings, got {}",
                    documents.len(),
                    embeddings.len()
                ),
            ));
        }
        for embedding in &embeddings {
            self.validate_embedding(embedding)?;
        }

        let mut rows = self.write()?;
        let start = rows.len();
        let ids: Vec<DocumentId> = (start..start + documents.len())
            .map(|i| DocumentId::new(format!("doc-{i}")))
            .collect();
        rows.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .zip(ids.iter().cloned())
                .map(|((document, embedding), id)| StoredRow {
                    id,
                    document,
                    embedding,
                }),
        );
        Ok(ids)
    }

    fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::InvalidInput(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }
        Ok(())
    }

    fn validate_query(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::search(
                "validate_query",
                format!(
                    "query dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    embedding.len()
                ),
            ));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoredRow>>> {
        self.rows
            .read()
            .map_err(|e| Error::search("store_read", e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoredRow>>> {
        self.rows
            .write()
            .map_err(|e| Error::failed("store_write", e.to_string()))
    }

    /// Returns row indices ordered by descending query similarity.
    fn ranked(rows: &[StoredRow], embedding: &[f32], limit: usize) -> Vec<(usize, f32)> {
        let mut scores: Vec<(usize, f32)> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, cosine_similarity(embedding, &row.embedding)))
            .collect();

        // Stable: equal scores keep insertion order, NaN scores rank last.
        scores.sort_by(|a, b| {
            a.1.is_nan()
                .cmp(&b.1.is_nan())
                .then_with(|| b.1.total_cmp(&a.1))
        });
        scores.truncate(limit);
        scores
    }
}

impl VectorStore for MemoryVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    #[instrument(skip(self, embedding))]
    fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.validate_query(embedding)?;
        let rows = self.read()?;

        Ok(Self::ranked(&rows, embedding, k)
            .into_iter()
            .map(|(i, score)| ScoredDocument {
                document: rows[i].document.clone(),
                score,
            })
            .collect())
    }

    #[instrument(
        skip(self, embedding),
        fields(k = request.k, fetch_k = request.fetch_k, lambda_mult = request.lambda_mult)
    )]
    fn max_marginal_relevance_search_by_vector(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>> {
        self.validate_query(embedding)?;
        let rows = self.read()?;

        let pool = Self::ranked(&rows, embedding, request.fetch_k);
        let pool_embeddings: Vec<&[f32]> = pool
            .iter()
            .map(|&(i, _)| rows[i].embedding.as_slice())
            .collect();
        let picks =
            maximal_marginal_relevance(embedding, &pool_embeddings, request.k, request.lambda_mult);

        tracing::debug!(
            pool_size = pool.len(),
            selected = picks.len(),
            "MMR search complete"
        );

        Ok(picks
            .into_iter()
            .map(|p| rows[pool[p].0].document.clone())
            .collect())
    }
}

#[async_trait]
impl AsyncVectorStore for MemoryVectorStore {
    async fn similarity_search_by_vector_async(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.similarity_search_by_vector(embedding, k)
    }

    async fn max_marginal_relevance_search_by_vector_async(
        &self,
        embedding: &[f32],
        request: MmrRequest,
    ) -> Result<Vec<Document>> {
        self.max_marginal_relevance_search_by_vector(embedding, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use tempfile::TempDir;

    fn axis(dimensions: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimensions];
        v[hot] = 1.0;
        v
    }

    fn three_axis_store() -> MemoryVectorStore {
        let store = MemoryVectorStore::new(3);
        store
            .add_embedded(Document::new("x"), vec![1.0, 0.0, 0.0])
            .unwrap();
        store
            .add_embedded(Document::new("x-ish"), vec![0.95, 0.05, 0.0])
            .unwrap();
        store
            .add_embedded(Document::new("z"), vec![0.0, 0.0, 1.0])
            .unwrap();
        store
    }

    #[test]
    fn test_add_rejects_wrong_dimensions() {
        let store = MemoryVectorStore::new(4);
        let err = store
            .add_embedded(Document::new("bad"), vec![1.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_similarity_search_orders_by_score() {
        let store = three_axis_store();
        let results = store
            .similarity_search_by_vector(&[1.0, 0.0, 0.0], 2)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.page_content, "x");
        assert_eq!(results[1].document.page_content, "x-ish");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_nan_rows_rank_last() {
        let store = MemoryVectorStore::new(3);
        store
            .add_embedded(Document::new("broken"), vec![f32::NAN, 0.0, 0.0])
            .unwrap();
        store
            .add_embedded(Document::new("z"), vec![0.0, 0.0, 1.0])
            .unwrap();
        store
            .add_embedded(Document::new("x"), vec![1.0, 0.0, 0.0])
            .unwrap();

        let results = store
            .similarity_search_by_vector(&[1.0, 0.0, 0.0], 3)
            .unwrap();
        let contents: Vec<&str> = results
            .iter()
            .map(|r| r.document.page_content.as_str())
            .collect();
        assert_eq!(contents, vec!["x", "z", "broken"]);
    }

    #[test]
    fn test_query_dimension_mismatch_is_search_error() {
        let store = three_axis_store();
        let err = store.similarity_search_by_vector(&[1.0], 2).unwrap_err();
        assert_eq!(err.origin(), crate::ErrorOrigin::Search);
    }

    #[test]
    fn test_mmr_prefers_diverse_second_pick() {
        let store = three_axis_store();
        let docs = store
            .max_marginal_relevance_search_by_vector(&[1.0, 0.0, 0.3], MmrRequest::new(2, 3, 0.3))
            .unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.page_content.as_str()).collect();
        assert_eq!(texts, vec!["x", "z"]);
    }

    #[test]
    fn test_mmr_respects_k_and_fetch_k() {
        let store = MemoryVectorStore::new(8);
        for i in 0..8 {
            store
                .add_embedded(Document::new(format!("axis {i}")), axis(8, i))
                .unwrap();
        }
        let docs = store
            .max_marginal_relevance_search_by_vector(&axis(8, 0), MmrRequest::new(5, 3, 0.5))
            .unwrap();
        assert_eq!(docs.len(), 3);
        let docs = store
            .max_marginal_relevance_search_by_vector(&axis(8, 0), MmrRequest::new(5, 8, 0.5))
            .unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].page_content, "axis 0");
    }

    #[test]
    fn test_add_documents_keeps_metadata() {
        let embedder = HashEmbedder::with_dimensions(32);
        let store = MemoryVectorStore::new(32);
        let ids = store
            .add_documents(
                vec![Document::new("Honey never spoils").with_source("facts.txt")],
                &embedder,
            )
            .unwrap();
        assert_eq!(ids, vec![DocumentId::new("doc-0")]);

        let query = embedder.embed("honey never spoils").unwrap();
        let hit = store.similarity_search_by_vector(&query, 1).unwrap();
        assert_eq!(hit[0].document.source(), Some("facts.txt"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = MemoryVectorStore::open(&path, 3).unwrap();
        store
            .add_embedded(Document::new("kept").with_source("a.txt"), vec![0.0, 1.0, 0.0])
            .unwrap();
        store.save().unwrap();

        let reopened = MemoryVectorStore::open(&path, 3).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert_eq!(MemoryVectorStore::peek_dimensions(&path).unwrap(), 3);
    }

    #[test]
    fn test_load_dimension_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = MemoryVectorStore::open(&path, 3).unwrap();
        store.save().unwrap();

        let err = MemoryVectorStore::open(&path, 4).err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let store = MemoryVectorStore::new(3);
        assert!(store.path().is_none());
        store.save().unwrap();
    }

    #[tokio::test]
    async fn test_async_search_matches_blocking() {
        let store = three_axis_store();
        let request = MmrRequest::new(2, 3, 0.5);
        let blocking = store
            .max_marginal_relevance_search_by_vector(&[0.0, 0.0, 1.0], request)
            .unwrap();
        let suspending = store
            .max_marginal_relevance_search_by_vector_async(&[0.0, 0.0, 1.0], request)
            .await
            .unwrap();
        assert_eq!(blocking, suspending);
    }
}
