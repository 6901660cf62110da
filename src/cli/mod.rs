//! CLI command implementations.
//!
//! Each submodule implements one subcommand of the `factsieve` binary. The
//! handlers write to any [`Write`](std::io::Write) so they can be exercised
//! without a terminal.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `index` | Load a text file, chunk it, embed the chunks, persist the store |
//! | `query` | Run the redundancy-filtered MMR retriever against a store |
//! | `similar` | Plain similarity search with scores (no MMR, no filtering) |
//!
//! # Example Usage
//!
//! ```bash
//! # Build a store from a facts file
//! factsieve index facts.txt --chunk-size 200
//!
//! # Ask a question, dropping near-duplicate answers
//! factsieve query "What is an interesting fact about the English language?"
//!
//! # Compare against unfiltered similarity search
//! factsieve similar "What is an interesting fact about the English language?" --k 5
//! ```

mod index;
mod output;
mod query;
mod similar;

pub use index::{IndexArgs, IndexSummary, cmd_index};
pub use output::OutputFormat;
pub use query::{QueryArgs, cmd_query, cmd_query_async};
pub use similar::{DEFAULT_SIMILAR_K, SimilarArgs, cmd_similar};

use crate::storage::MemoryVectorStore;
use crate::{Error, Result};
use std::path::Path;

/// Opens an existing persisted store for searching.
fn open_existing_store(path: &Path, dimensions: usize) -> Result<MemoryVectorStore> {
    if !path.exists() {
        return Err(Error::InvalidInput(format!(
            "store not found at {}; run `factsieve index` first",
            path.display()
        )));
    }
    MemoryVectorStore::open(path, dimensions)
}
