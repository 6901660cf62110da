//! Storage backend traits.

mod vector;

pub use vector::{AsyncVectorStore, VectorStore};
