//! Retrieval filter configuration.

use crate::models::MmrRequest;
use crate::{Error, Result};
use serde::Deserialize;

/// Configuration for a [`RedundantFilterRetriever`](super::RedundantFilterRetriever).
///
/// Immutable once a retriever is built from it.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `FACTSIEVE_THRESHOLD` | f32 | `0.8` | Similarity at which a candidate is redundant |
/// | `FACTSIEVE_K` | usize | `5` | Maximum documents returned |
/// | `FACTSIEVE_FETCH_K` | usize | `20` | Candidates fetched before MMR ranking |
/// | `FACTSIEVE_LAMBDA_MULT` | f32 | `0.5` | 1.0 favours relevance, 0.0 diversity |
///
/// # Example
///
/// ```rust
/// use factsieve::retrieval::FilterConfig;
///
/// let config = FilterConfig::default().with_threshold(0.9).with_k(3);
/// assert!(config.validate().is_ok());
/// assert!(FilterConfig::default().with_threshold(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Similarity threshold τ in `[0, 1]`.
    pub threshold: f32,
    /// Result count k.
    pub k: usize,
    /// Candidate pool size, at least `k`.
    pub fetch_k: usize,
    /// Diversity trade-off λ in `[0, 1]`.
    pub lambda_mult: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            k: 5,
            fetch_k: 20,
            lambda_mult: 0.5,
        }
    }
}

impl FilterConfig {
    /// Creates a configuration from environment variables.
    ///
    /// Falls back to defaults for unset or unparsable variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies any `FACTSIEVE_*` overrides present in the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(threshold) = env_parse("FACTSIEVE_THRESHOLD") {
            self.threshold = threshold;
        }
        if let Some(k) = env_parse("FACTSIEVE_K") {
            self.k = k;
        }
        if let Some(fetch_k) = env_parse("FACTSIEVE_FETCH_K") {
            self.fetch_k = fetch_k;
        }
        if let Some(lambda_mult) = env_parse("FACTSIEVE_LAMBDA_MULT") {
            self.lambda_mult = lambda_mult;
        }
        self
    }

    /// Sets the similarity threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the result count.
    #[must_use]
    pub const fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the candidate pool size.
    #[must_use]
    pub const fn with_fetch_k(mut self, fetch_k: usize) -> Self {
        self.fetch_k = fetch_k;
        self
    }

    /// Sets the diversity trade-off.
    #[must_use]
    pub const fn with_lambda_mult(mut self, lambda_mult: f32) -> Self {
        self.lambda_mult = lambda_mult;
        self
    }

    /// Checks `threshold, lambda_mult ∈ [0, 1]` and `fetch_k >= k`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first violated bound.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.lambda_mult) {
            return Err(Error::InvalidConfig(format!(
                "lambda_mult {} is outside [0, 1]",
                self.lambda_mult
            )));
        }
        if self.fetch_k < self.k {
            return Err(Error::InvalidConfig(format!(
                "fetch_k ({}) must be at least k ({})",
                self.fetch_k, self.k
            )));
        }
        Ok(())
    }

    /// Returns the store request this configuration describes.
    #[must_use]
    pub const fn mmr_request(&self) -> MmrRequest {
        MmrRequest::new(self.k, self.fetch_k, self.lambda_mult)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
