//! Loading and chunking plain-text sources into [`Document`](crate::models::Document)s.

mod loader;
mod splitter;

pub use loader::load_text_file;
pub use splitter::{CHUNK_INDEX_KEY, END_OFFSET_KEY, START_OFFSET_KEY, TextSplitter};
