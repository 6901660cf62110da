//! Storage layer abstraction.
//!
//! - **Traits**: blocking and suspending vector search contracts
//! - **Vector**: concrete stores and the MMR ranking they share

// Allow cast precision loss for score calculations where exact precision is not critical.
#![allow(clippy::cast_precision_loss)]
// Allow significant_drop_tightening - guards are held only for the scan they protect.
#![allow(clippy::significant_drop_tightening)]

pub mod traits;
pub mod vector;

pub use traits::{AsyncVectorStore, VectorStore};
pub use vector::{MemoryVectorStore, maximal_marginal_relevance};
