//! Documentation sources
//!
//! Source files carry structured text inside specially tagged comment
//! blocks. The extractor pulls those blocks out and the adapter table
//! decides, by file suffix, which comment syntax a file uses.

mod adapter;
mod extractor;

pub use adapter::{AdapterTable, SourceAdapter, SourceKind};
pub use extractor::{extract, BlockPattern, BLOCK_TAG};
