//! Data models for factsieve.
//!
//! Documents are the unit of retrieval; search types carry scores and the
//! request shape handed to a vector store.

mod document;
mod search;

pub use document::{Document, DocumentId, Metadata};
pub use search::{MmrRequest, ScoredDocument};
