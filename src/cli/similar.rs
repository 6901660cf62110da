//! Similar CLI command.

use super::output::write_scored;
use super::{OutputFormat, open_existing_store};
use crate::Result;
use crate::config::SieveConfig;
use crate::embedding::{Embedder, EmbeddingProvider};
use crate::models::ScoredDocument;
use crate::storage::VectorStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of results for `factsieve similar`.
pub const DEFAULT_SIMILAR_K: usize = 4;

/// Arguments for `factsieve similar`.
#[derive(Debug, Clone, Default)]
pub struct SimilarArgs {
    /// The question to search for.
    pub question: String,
    /// Store path override.
    pub store: Option<PathBuf>,
    /// Number of results (defaults to 4).
    pub k: Option<usize>,
    /// Output format.
    pub format: OutputFormat,
}

/// Runs a plain similarity search, without MMR or redundancy filtering.
///
/// # Errors
///
/// Returns an error if the store is missing or unreadable or embedding fails.
pub fn cmd_similar<W: Write>(
    config: &SieveConfig,
    args: &SimilarArgs,
    embedder: Arc<dyn EmbeddingProvider>,
    out: &mut W,
) -> Result<Vec<ScoredDocument>> {
    let store_path = args.store.as_ref().unwrap_or(&config.store.path);
    let store = open_existing_store(store_path, embedder.dimensions())?;

    let query_embedding = embedder.embed(&args.question)?;
    let results = store
        .similarity_search_by_vector(&query_embedding, args.k.unwrap_or(DEFAULT_SIMILAR_K))?;

    write_scored(out, &results, args.format)?;
    Ok(results)
}
