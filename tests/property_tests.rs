//! Property-based tests for similarity and redundancy filtering.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Cosine similarity is symmetric, bounded and self-similar
//! - Zero vectors are never similar to anything
//! - Filtered output is bounded by `k`, duplicate-free and order-preserving
//! - MMR returns distinct indices, first pick is the most relevant

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use factsieve::embedding::cosine_similarity;
use factsieve::retrieval::{RedundancyGate, Verdict};
use factsieve::storage::maximal_marginal_relevance;
use proptest::prelude::*;

const DIMS: usize = 8;

fn vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, DIMS)
}

fn nonzero_vector() -> impl Strategy<Value = Vec<f32>> {
    vector().prop_filter("non-zero norm", |v| v.iter().any(|x| x.abs() > 1e-3))
}

/// Runs candidates through a gate; returns accepted indices.
fn filter(candidates: &[Vec<f32>], threshold: f32, k: usize) -> Vec<usize> {
    let mut gate = RedundancyGate::new(threshold, k);
    for (i, embedding) in candidates.iter().enumerate() {
        if matches!(gate.offer(i, embedding.clone()), Verdict::Full) {
            break;
        }
    }
    gate.into_accepted()
}

proptest! {
    /// Property: sim(a, b) == sim(b, a).
    #[test]
    fn prop_cosine_symmetric(a in vector(), b in vector()) {
        prop_assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    /// Property: sim(a, a) == 1 for non-zero a.
    #[test]
    fn prop_cosine_self_is_one(a in nonzero_vector()) {
        prop_assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-4);
    }

    /// Property: similarity stays within [-1, 1].
    #[test]
    fn prop_cosine_bounded(a in vector(), b in vector()) {
        let sim = cosine_similarity(&a, &b);
        prop_assert!((-1.0 - 1e-4..=1.0 + 1e-4).contains(&sim));
    }

    /// Property: similarity with the zero vector is exactly 0.
    #[test]
    fn prop_cosine_zero_vector(a in vector()) {
        let zero = vec![0.0; DIMS];
        prop_assert_eq!(cosine_similarity(&a, &zero), 0.0);
        prop_assert_eq!(cosine_similarity(&zero, &a), 0.0);
    }

    /// Property: output never exceeds k.
    #[test]
    fn prop_filter_bounded(
        candidates in prop::collection::vec(vector(), 0..30),
        threshold in 0.0f32..=1.0,
        k in 1usize..10,
    ) {
        prop_assert!(filter(&candidates, threshold, k).len() <= k);
    }

    /// Property: every accepted pair is below the threshold.
    #[test]
    fn prop_filter_no_duplicates(
        candidates in prop::collection::vec(nonzero_vector(), 0..30),
        threshold in 0.05f32..=1.0,
        k in 1usize..30,
    ) {
        let accepted = filter(&candidates, threshold, k);
        for (i, &a) in accepted.iter().enumerate() {
            for &b in &accepted[i + 1..] {
                prop_assert!(cosine_similarity(&candidates[a], &candidates[b]) < threshold);
            }
        }
    }

    /// Property: accepted candidates keep their input order.
    #[test]
    fn prop_filter_preserves_order(
        candidates in prop::collection::vec(vector(), 0..30),
        threshold in 0.0f32..=1.0,
        k in 1usize..30,
    ) {
        let accepted = filter(&candidates, threshold, k);
        prop_assert!(accepted.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: the first candidate is always accepted.
    #[test]
    fn prop_filter_keeps_first(
        candidates in prop::collection::vec(vector(), 1..30),
        threshold in 0.0f32..=1.0,
        k in 1usize..30,
    ) {
        let accepted = filter(&candidates, threshold, k);
        prop_assert_eq!(accepted.first(), Some(&0));
    }

    /// Property: a candidate is dropped only if it matches an earlier accepted one.
    #[test]
    fn prop_filter_drops_only_redundant(
        candidates in prop::collection::vec(nonzero_vector(), 0..20),
        threshold in 0.05f32..=1.0,
    ) {
        let accepted = filter(&candidates, threshold, candidates.len().max(1));
        for (i, candidate) in candidates.iter().enumerate() {
            if accepted.contains(&i) {
                continue;
            }
            let matched = accepted
                .iter()
                .take_while(|&&a| a < i)
                .any(|&a| cosine_similarity(&candidates[a], candidate) >= threshold);
            prop_assert!(matched, "candidate {} dropped without a match", i);
        }
    }

    /// Property: MMR picks distinct indices, at most k, starting with the most relevant.
    #[test]
    fn prop_mmr_distinct_and_bounded(
        query in nonzero_vector(),
        candidates in prop::collection::vec(vector(), 0..20),
        k in 0usize..10,
        lambda in 0.0f32..=1.0,
    ) {
        let picks = maximal_marginal_relevance(&query, &candidates, k, lambda);
        prop_assert_eq!(picks.len(), k.min(candidates.len()));

        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), picks.len());

        if let Some(&first) = picks.first() {
            let best = candidates
                .iter()
                .map(|c| cosine_similarity(&query, c))
                .fold(f32::NEG_INFINITY, f32::max);
            prop_assert!((cosine_similarity(&query, &candidates[first]) - best).abs() < 1e-6);
        }
    }
}
