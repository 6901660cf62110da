//! Index CLI command.

use crate::config::SieveConfig;
use crate::embedding::{Embedder, EmbeddingProvider};
use crate::ingest::{TextSplitter, load_text_file};
use crate::storage::{MemoryVectorStore, VectorStore};
use crate::{Error, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Arguments for `factsieve index`.
#[derive(Debug, Clone, Default)]
pub struct IndexArgs {
    /// Text file to index.
    pub file: PathBuf,
    /// Store path override.
    pub store: Option<PathBuf>,
    /// Chunk size override.
    pub chunk_size: Option<usize>,
    /// Chunk overlap override.
    pub chunk_overlap: Option<usize>,
}

/// What an index run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    /// Chunks added by this run.
    pub added: usize,
    /// Rows in the store after saving.
    pub total: usize,
    /// Where the store was written.
    pub store: PathBuf,
}

/// Loads, chunks, embeds and appends a file to the persisted store.
///
/// Existing rows are kept; indexing the same file twice stores its chunks
/// twice.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the splitter settings are
/// invalid, embedding fails, or the store cannot be loaded or saved.
#[instrument(skip(config, embedder, out), fields(file = %args.file.display()))]
pub fn cmd_index<W: Write>(
    config: &SieveConfig,
    args: &IndexArgs,
    embedder: Arc<dyn EmbeddingProvider>,
    out: &mut W,
) -> Result<IndexSummary> {
    let splitter = TextSplitter::new(
        args.chunk_size.unwrap_or(config.splitter.chunk_size),
        args.chunk_overlap.unwrap_or(config.splitter.chunk_overlap),
    )?;
    let store_path = args.store.clone().unwrap_or_else(|| config.store.path.clone());

    let document = load_text_file(&args.file)?;
    let chunks = splitter.split_documents(&[document])?;
    let added = chunks.len();

    let store = MemoryVectorStore::open(&store_path, embedder.dimensions())?;
    store.add_documents(chunks, embedder.as_ref())?;
    store.save()?;
    let total = store.len()?;

    tracing::info!(added, total, store = %store_path.display(), "Indexed file");
    writeln!(
        out,
        "Indexed {added} chunks from {} into {} ({total} total)",
        args.file.display(),
        store_path.display()
    )
    .map_err(|e| Error::failed("write_output", e))?;

    Ok(IndexSummary {
        added,
        total,
        store: store_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use tempfile::TempDir;

    #[test]
    fn test_index_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("facts.txt");
        std::fs::write(&file, "Honey never spoils.\nOctopuses have three hearts.\n").unwrap();
        let store = dir.path().join("store").join("facts.json");

        let args = IndexArgs {
            file,
            store: Some(store.clone()),
            chunk_size: Some(30),
            chunk_overlap: None,
        };
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::with_dimensions(32));
        let mut out = Vec::new();

        let first = cmd_index(&SieveConfig::default(), &args, Arc::clone(&embedder), &mut out)
            .unwrap();
        assert_eq!(first.added, 2);
        assert_eq!(first.total, 2);
        assert!(store.exists());

        let second = cmd_index(&SieveConfig::default(), &args, embedder, &mut out).unwrap();
        assert_eq!(second.total, 4);
        assert!(String::from_utf8(out).unwrap().contains("Indexed 2 chunks"));
    }

    #[test]
    fn test_index_rejects_bad_overlap() {
        let args = IndexArgs {
            file: PathBuf::from("unused.txt"),
            chunk_size: Some(10),
            chunk_overlap: Some(10),
            ..IndexArgs::default()
        };
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder::new());
        let err = cmd_index(&SieveConfig::default(), &args, embedder, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
