//! Character-based document chunking.

use crate::models::Document;
use crate::{Error, Result};
use text_splitter::{ChunkConfig, TextSplitter as TextSplitterImpl};
use tracing::{debug, instrument};

/// Metadata key holding a chunk's position within its parent document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";
/// Metadata key holding a chunk's starting byte offset in its parent.
pub const START_OFFSET_KEY: &str = "start_offset";
/// Metadata key holding a chunk's end byte offset (exclusive) in its parent.
pub const END_OFFSET_KEY: &str = "end_offset";

/// Splits documents into chunks of at most `chunk_size` characters.
///
/// Chunks are trimmed and break on the largest semantic unit that fits
/// (paragraph, line, sentence, word).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        debug!(chunk_size, chunk_overlap, "Created text splitter");
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Returns the maximum chunk size in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the overlap between neighbouring chunks.
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn chunk_config(&self) -> Result<ChunkConfig<text_splitter::Characters>> {
        ChunkConfig::new(self.chunk_size)
            .with_overlap(self.chunk_overlap)
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Splits text into `(byte_offset, chunk)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk configuration is rejected.
    pub fn split_text<'a>(&self, text: &'a str) -> Result<Vec<(usize, &'a str)>> {
        let splitter = TextSplitterImpl::new(self.chunk_config()?);
        Ok(splitter.chunk_indices(text).collect())
    }

    /// Splits each document, keeping its metadata on every chunk.
    ///
    /// Each chunk also gets `chunk_index`, `start_offset` and `end_offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk configuration is rejected.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub fn split_documents(&self, documents: &[Document]) -> Result<Vec<Document>> {
        let splitter = TextSplitterImpl::new(self.chunk_config()?);

        let mut chunks = Vec::new();
        for document in documents {
            for (index, (offset, text)) in splitter.chunk_indices(&document.page_content).enumerate()
            {
                let mut chunk = Document::new(text);
                chunk.metadata.clone_from(&document.metadata);
                chunks.push(
                    chunk
                        .with_metadata(CHUNK_INDEX_KEY, index)
                        .with_metadata(START_OFFSET_KEY, offset)
                        .with_metadata(END_OFFSET_KEY, offset + text.len()),
                );
            }
        }

        debug!(chunk_count = chunks.len(), "Split documents into chunks");
        Ok(chunks)
    }
}
