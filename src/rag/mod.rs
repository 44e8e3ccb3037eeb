//! Retrieval answering over an in-memory document index.
//!
//! This module provides:
//! - `RetrievalQa`: embeds the question, retrieves top-k chunks and asks the
//!   chat model to answer from them
//! - `CandidateAnswer`: the model's trimmed answer plus the chunks it saw

mod qa;

pub use qa::{CandidateAnswer, RetrievalQa};
