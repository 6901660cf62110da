//! Greedy, order-preserving redundancy filter.

use crate::embedding::cosine_similarity;

/// Outcome of offering a candidate to a [`RedundancyGate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// The candidate was kept.
    Accepted,
    /// The candidate was at least `threshold`-similar to an accepted one.
    Redundant {
        /// Position of the matching accepted candidate.
        matched: usize,
        /// Similarity to that candidate.
        similarity: f32,
    },
    /// The gate already holds `limit` candidates.
    Full,
}

/// Accepts candidates one at a time, rejecting near-duplicates.
///
/// Redundancy is judged only against candidates already accepted, so the
/// earlier of two duplicates always wins. Zero-norm embeddings have
/// similarity 0.0 to everything and are never redundant.
#[derive(Debug)]
pub struct RedundancyGate<T> {
    threshold: f32,
    limit: usize,
    accepted: Vec<T>,
    embeddings: Vec<Vec<f32>>,
}

impl<T> RedundancyGate<T> {
    /// Creates an empty gate keeping at most `limit` candidates.
    #[must_use]
    pub fn new(threshold: f32, limit: usize) -> Self {
        Self {
            threshold,
            limit,
            accepted: Vec::with_capacity(limit.min(64)),
            embeddings: Vec::with_capacity(limit.min(64)),
        }
    }

    /// Returns true once `limit` candidates have been accepted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.accepted.len() >= self.limit
    }

    /// Number of accepted candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// Returns true if nothing has been accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Finds the first accepted embedding at or above the threshold.
    ///
    /// Zero-norm embeddings on either side are skipped, even at a threshold
    /// of 0.0.
    #[must_use]
    pub fn find_redundant(&self, embedding: &[f32]) -> Option<(usize, f32)> {
        if is_zero(embedding) {
            return None;
        }
        self.embeddings
            .iter()
            .enumerate()
            .filter(|(_, kept)| !is_zero(kept))
            .map(|(i, kept)| (i, cosine_similarity(embedding, kept)))
            .find(|&(_, similarity)| similarity >= self.threshold)
    }

    /// Offers a candidate with its embedding.
    pub fn offer(&mut self, candidate: T, embedding: Vec<f32>) -> Verdict {
        if self.is_full() {
            return Verdict::Full;
        }
        if let Some((matched, similarity)) = self.find_redundant(&embedding) {
            return Verdict::Redundant {
                matched,
                similarity,
            };
        }
        self.accepted.push(candidate);
        self.embeddings.push(embedding);
        Verdict::Accepted
    }

    /// Returns the accepted candidates in the order they were offered.
    #[must_use]
    pub fn into_accepted(self) -> Vec<T> {
        self.accepted
    }
}

fn is_zero(embedding: &[f32]) -> bool {
    embedding.iter().all(|x| *x == 0.0)
}
