//! Diverse retrieval with near-duplicate filtering.
//!
//! A [`RedundantFilterRetriever`] asks its vector store for an MMR-ranked
//! candidate set, then passes the candidates in store order through a
//! [`RedundancyGate`], which drops any candidate whose embedding is at least
//! `threshold`-similar to one already accepted.
//!
//! The blocking and suspending entry points share the gate, so they differ
//! only in how the embedder and store are called.

mod config;
mod gate;
mod retriever;

pub use config::FilterConfig;
pub use gate::{RedundancyGate, Verdict};
pub use retriever::{AsyncRetriever, RedundantFilterRetriever, Retriever};
