//! Vector store implementations.

mod memory;
mod mmr;

pub use memory::MemoryVectorStore;
pub use mmr::maximal_marginal_relevance;
