//! File loading.

use crate::models::Document;
use crate::{Error, Result};
use std::path::Path;
use tracing::instrument;

/// Reads a UTF-8 text file into a single document.
///
/// The document's `source` metadata is the path as given.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be read or is not UTF-8.
#[instrument(fields(path = %path.display()))]
pub fn load_text_file(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::failed("load_text_file", e))?;
    tracing::debug!(bytes = contents.len(), "Loaded text file");
    Ok(Document::new(contents).with_source(path.display().to_string()))
}
