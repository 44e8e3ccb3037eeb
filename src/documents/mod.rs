//! Document indexing: extraction, chunking and an in-memory vector index.
//!
//! Everything here lives for one request. Nothing is persisted.

mod chunker;
mod extract;
mod index;

pub use chunker::{Chunker, DocumentChunk};
pub use extract::{
    extract_all, extract_all_in, DocumentError, DocumentKind, ExtractedDocument, UploadedDocument,
};
pub use index::{index, ScoredChunk, Retriever};
