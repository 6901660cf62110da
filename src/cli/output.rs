//! Result rendering.

use crate::models::{Document, ScoredDocument};
use crate::{Error, Result};
use std::io::Write;

/// Output format for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Numbered plain text (default).
    #[default]
    Text,
    /// Pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// Selects JSON when `json` is set.
    #[must_use]
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

fn write_error(e: impl ToString) -> Error {
    Error::failed("write_output", e)
}

/// Writes retrieved documents.
pub(super) fn write_documents<W: Write>(
    out: &mut W,
    documents: &[Document],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, documents).map_err(write_error)?;
            writeln!(out).map_err(write_error)
        },
        OutputFormat::Text => {
            if documents.is_empty() {
                return writeln!(out, "No documents found.").map_err(write_error);
            }
            for (i, doc) in documents.iter().enumerate() {
                writeln!(out, "{}. {}", i + 1, doc.page_content.trim()).map_err(write_error)?;
                if let Some(source) = doc.source() {
                    writeln!(out, "   source: {source}").map_err(write_error)?;
                }
            }
            Ok(())
        },
    }
}

/// Writes scored documents.
pub(super) fn write_scored<W: Write>(
    out: &mut W,
    results: &[ScoredDocument],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results).map_err(write_error)?;
            writeln!(out).map_err(write_error)
        },
        OutputFormat::Text => {
            if results.is_empty() {
                return writeln!(out, "No documents found.").map_err(write_error);
            }
            for result in results {
                writeln!(
                    out,
                    "{:.4}  {}",
                    result.score,
                    result.document.page_content.trim()
                )
                .map_err(write_error)?;
            }
            Ok(())
        },
    }
}
