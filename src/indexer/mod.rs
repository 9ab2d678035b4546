//! File walking, text extraction, structure description and chunking
//!
//! These are the synchronous stages of an index build: enumerate files,
//! turn each into [`Document`](crate::types::Document)s, and split those
//! into [`Chunk`](crate::types::Chunk)s ready for embedding.

mod chunker;
mod extractor;
mod file_walker;
mod pdf_extractor;
mod structure;

pub use chunker::TextChunker;
pub use extractor::TextExtractor;
pub use file_walker::FileWalker;
pub use pdf_extractor::extract_pdf_to_markdown;
pub use structure::{DirectoryTreeDescriber, StructureDescriber};
