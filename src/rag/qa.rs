use std::sync::Arc;

use serde::Serialize;

use crate::core::config::{LlmConfig, RagConfig};
use crate::core::errors::ApiError;
use crate::documents::{DocumentChunk, Retriever};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the user's question.\n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.";
const CONTEXT_SEPARATOR: &str = "\n----------------\n";

#[derive(Debug, Clone, Serialize)]
pub struct CandidateAnswer {
    /// Trimmed model output
    pub text: String,
    /// Chunks placed in the prompt, best first
    pub source_documents: Vec<DocumentChunk>,
}

/// "Stuff" chain: all retrieved chunks go into a single prompt.
#[derive(Clone)]
pub struct RetrievalQa {
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
    temperature: f64,
}

impl RetrievalQa {
    pub fn new(llm: Arc<dyn LlmProvider>, rag: &RagConfig, llm_config: &LlmConfig) -> Self {
        Self {
            llm,
            top_k: rag.top_k,
            temperature: llm_config.temperature,
        }
    }

    pub async fn answer(
        &self,
        retriever: &Retriever,
        query: &str,
    ) -> Result<CandidateAnswer, ApiError> {
        let query_embedding = self
            .llm
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Upstream("No embedding returned for the question".to_string()))?;

        let retrieved = retriever.retrieve(&query_embedding, self.top_k);
        tracing::debug!(
            "Retrieved {} of {} chunks for the question",
            retrieved.len(),
            retriever.len()
        );

        let source_documents: Vec<DocumentChunk> =
            retrieved.into_iter().map(|scored| scored.chunk).collect();

        let request = ChatRequest::new(build_messages(&source_documents, query))
            .with_temperature(self.temperature);
        let raw = self.llm.chat(request).await?;

        Ok(CandidateAnswer {
            text: raw.trim().to_string(),
            source_documents,
        })
    }
}

fn build_messages(chunks: &[DocumentChunk], query: &str) -> Vec<ChatMessage> {
    let context = chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    vec![
        ChatMessage::system(format!("{}{}{}", SYSTEM_PROMPT, CONTEXT_SEPARATOR, context)),
        ChatMessage::user(query),
    ]
}
