use std::cmp::Ordering;

use super::chunker::{Chunker, DocumentChunk};
use super::extract::ExtractedDocument;
use crate::core::config::RagConfig;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// A chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f64,
}

/// In-memory vector index over one request's documents.
#[derive(Debug, Default)]
pub struct Retriever {
    entries: Vec<(DocumentChunk, Vec<f32>)>,
}

impl Retriever {
    pub fn new(entries: Vec<(DocumentChunk, Vec<f32>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by cosine similarity, best first. Ties keep index order.
    pub fn retrieve(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Chunks and embeds `documents`, producing a [`Retriever`].
pub async fn index(
    embedder: &dyn LlmProvider,
    documents: &[ExtractedDocument],
    config: &RagConfig,
) -> Result<Retriever, ApiError> {
    let chunker = Chunker::from_config(config);
    let mut chunks: Vec<DocumentChunk> = Vec::new();
    for document in documents.iter().filter(|d| !d.is_empty()) {
        let remaining = config.max_chunks.saturating_sub(chunks.len());
        if remaining == 0 {
            tracing::warn!(
                "Chunk limit {} reached; skipping the rest of the documents",
                config.max_chunks
            );
            break;
        }
        let mut doc_chunks = chunker.split(&document.text, &document.name);
        doc_chunks.truncate(remaining);
        chunks.extend(doc_chunks);
    }

    let mut entries = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(config.embed_batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(ApiError::Upstream(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }
        entries.extend(batch.iter().cloned().zip(embeddings));
    }

    tracing::info!(
        "Indexed {} chunks from {} documents",
        entries.len(),
        documents.len()
    );
    Ok(Retriever::new(entries))
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
