//! Query CLI command.

use super::output::write_documents;
use super::{OutputFormat, open_existing_store};
use crate::Result;
use crate::config::SieveConfig;
use crate::embedding::{Embedder, EmbeddingProvider};
use crate::models::Document;
use crate::retrieval::{AsyncRetriever, FilterConfig, RedundantFilterRetriever, Retriever};
use crate::storage::MemoryVectorStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for `factsieve query`.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    /// The question to answer.
    pub question: String,
    /// Store path override.
    pub store: Option<PathBuf>,
    /// Similarity threshold override.
    pub threshold: Option<f32>,
    /// Result count override.
    pub k: Option<usize>,
    /// Candidate pool override.
    pub fetch_k: Option<usize>,
    /// Diversity trade-off override.
    pub lambda_mult: Option<f32>,
    /// Output format.
    pub format: OutputFormat,
}

impl QueryArgs {
    /// Resolves the filter configuration.
    ///
    /// Precedence, highest first: flags, `FACTSIEVE_*` environment, config file.
    #[must_use]
    pub fn filter_config(&self, base: FilterConfig) -> FilterConfig {
        let mut config = base.with_env_overrides();
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(k) = self.k {
            config = config.with_k(k);
        }
        if let Some(fetch_k) = self.fetch_k {
            config = config.with_fetch_k(fetch_k);
        }
        if let Some(lambda_mult) = self.lambda_mult {
            config = config.with_lambda_mult(lambda_mult);
        }
        config
    }
}

type FileRetriever = RedundantFilterRetriever<MemoryVectorStore, dyn EmbeddingProvider>;

fn build_retriever(
    config: &SieveConfig,
    args: &QueryArgs,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<FileRetriever> {
    let filter = args.filter_config(config.retrieval);
    // Reject bad flags before touching the store.
    filter.validate()?;

    let store_path = args.store.as_ref().unwrap_or(&config.store.path);
    let store = open_existing_store(store_path, embedder.dimensions())?;
    RedundantFilterRetriever::new(Arc::new(store), embedder, filter)
}

fn report<W: Write>(out: &mut W, documents: &[Document], format: OutputFormat) -> Result<()> {
    tracing::info!(returned = documents.len(), "Query complete");
    write_documents(out, documents, format)
}

/// Runs the filtered retriever on the blocking path.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the store is missing or
/// unreadable, or any collaborator fails.
pub fn cmd_query<W: Write>(
    config: &SieveConfig,
    args: &QueryArgs,
    embedder: Arc<dyn EmbeddingProvider>,
    out: &mut W,
) -> Result<Vec<Document>> {
    let retriever = build_retriever(config, args, embedder)?;
    let documents = retriever.retrieve(&args.question)?;
    report(out, &documents, args.format)?;
    Ok(documents)
}

/// Runs the filtered retriever on the suspending path.
///
/// # Errors
///
/// Same as [`cmd_query`].
pub async fn cmd_query_async<W: Write>(
    config: &SieveConfig,
    args: &QueryArgs,
    embedder: Arc<dyn EmbeddingProvider>,
    out: &mut W,
) -> Result<Vec<Document>> {
    let retriever = build_retriever(config, args, embedder)?;
    let documents = retriever.retrieve_async(&args.question).await?;
    report(out, &documents, args.format)?;
    Ok(documents)
}
