//! Maximal Marginal Relevance (MMR) ranking.
//!
//! Selects the next result that maximises relevance to the query and
//! minimises redundancy with already-selected results:
//!
//! `score(d) = λ · sim(d, q) − (1 − λ) · max_{s ∈ S} sim(d, s)`
//!
//! The first pick is always the candidate most similar to the query.

use crate::embedding::cosine_similarity;

/// Ranks `candidates` by MMR and returns the indices of up to `k` picks in
/// selection order.
///
/// `lambda_mult` is clamped to `[0, 1]`; 1.0 is pure relevance, 0.0 pure
/// diversity. Ties keep the earlier candidate.
#[must_use]
pub fn maximal_marginal_relevance<V: AsRef<[f32]>>(
    query: &[f32],
    candidates: &[V],
    k: usize,
    lambda_mult: f32,
) -> Vec<usize> {
    let limit = k.min(candidates.len());
    if limit == 0 {
        return Vec::new();
    }

    let lambda = lambda_mult.clamp(0.0, 1.0);
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c.as_ref()))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(limit);
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < limit {
        let mut best: Option<(usize, f32)> = None;
        for (pos, &idx) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(candidates[idx].as_ref(), candidates[s].as_ref()))
                .fold(None, |acc: Option<f32>, sim| Some(acc.map_or(sim, |a| a.max(sim))))
                .unwrap_or(0.0);
            let score = if selected.is_empty() {
                relevance[idx]
            } else {
                lambda.mul_add(relevance[idx], -(1.0 - lambda) * redundancy)
            };
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((pos, score));
            }
        }

        match best {
            Some((pos, _)) => selected.push(remaining.remove(pos)),
            None => break,
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        let none: Vec<Vec<f32>> = Vec::new();
        assert!(maximal_marginal_relevance(&[1.0, 0.0], &none, 3, 0.5).is_empty());
        assert!(maximal_marginal_relevance(&[1.0, 0.0], &[vec![1.0, 0.0]], 0, 0.5).is_empty());
    }

    #[test]
    fn test_first_pick_is_most_relevant() {
        let query = [1.0, 0.0];
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.1], vec![0.7, 0.7]];
        let picks = maximal_marginal_relevance(&query, &candidates, 1, 0.0);
        assert_eq!(picks, vec![1]);
    }

    #[test]
    fn test_pure_relevance_orders_by_similarity() {
        let query = [1.0, 0.0];
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]];
        let picks = maximal_marginal_relevance(&query, &candidates, 3, 1.0);
        assert_eq!(picks, vec![1, 2, 0]);
    }

    #[test]
    fn test_diversity_skips_near_duplicate() {
        let query = [1.0, 0.0, 0.2];
        let candidates = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.98, 0.2, 0.0],
            vec![0.6, 0.0, 0.8],
        ];
        let picks = maximal_marginal_relevance(&query, &candidates, 2, 0.5);
        assert_eq!(picks, vec![0, 2]);
    }

    #[test]
    fn test_k_larger_than_candidates() {
        let query = [1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let mut picks = maximal_marginal_relevance(&query, &candidates, 10, 0.5);
        picks.sort_unstable();
        assert_eq!(picks, vec![0, 1]);
    }
}
