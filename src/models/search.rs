//! Search request and result types.

use super::Document;
use serde::Serialize;

/// Parameters of a max-marginal-relevance search.
///
/// `lambda_mult` of 1.0 ranks purely by relevance, 0.0 purely by diversity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmrRequest {
    /// Number of documents to return.
    pub k: usize,
    /// Number of nearest candidates to rerank.
    pub fetch_k: usize,
    /// Relevance/diversity trade-off in `[0, 1]`.
    pub lambda_mult: f32,
}

impl MmrRequest {
    /// Creates a new request.
    #[must_use]
    pub const fn new(k: usize, fetch_k: usize, lambda_mult: f32) -> Self {
        Self {
            k,
            fetch_k,
            lambda_mult,
        }
    }
}

/// A document paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    /// The matched document.
    pub document: Document,
    /// Cosine similarity to the query (-1.0 to 1.0).
    pub score: f32,
}
