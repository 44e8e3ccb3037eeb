//! Ask pipeline: documents → retrieval answer → sufficiency check →
//! (answer | web search).

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::documents::{self, UploadedDocument};
use crate::fallback::SufficiencyPolicy;
use crate::llm::LlmProvider;
use crate::rag::RetrievalQa;
use crate::search::{self, WebSearch};

pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a question";
pub const NO_TEXT_MESSAGE: &str = "No extractable text found in the uploaded documents";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AskMode {
    /// Fall back to web search when the document answer looks weak.
    #[default]
    Fallback,
    /// Always return the document answer.
    Grounded,
}

impl FromStr for AskMode {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "fallback" => Ok(AskMode::Fallback),
            "grounded" => Ok(AskMode::Grounded),
            other => Err(ApiError::BadRequest(format!(
                "Invalid mode `{}`. Use fallback or grounded",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Documents,
    WebSearch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub document: String,
    pub chunk_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub answer: String,
    pub source: AnswerSource,
    pub fallback_used: bool,
    /// Document chunks behind a document answer; empty for web answers.
    pub sources: Vec<SourceRef>,
}

impl AskOutcome {
    fn from_web(answer: String, fallback_used: bool) -> Self {
        Self {
            answer,
            source: AnswerSource::WebSearch,
            fallback_used,
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AskRequest {
    pub query: String,
    pub documents: Vec<UploadedDocument>,
    pub mode: AskMode,
}

#[derive(Clone)]
pub struct AskService {
    config: Arc<AppConfig>,
    llm: Arc<dyn LlmProvider>,
    search: Arc<dyn WebSearch>,
    policy: Arc<dyn SufficiencyPolicy>,
    qa: RetrievalQa,
}

impl AskService {
    pub fn new(
        config: Arc<AppConfig>,
        llm: Arc<dyn LlmProvider>,
        search: Arc<dyn WebSearch>,
        policy: Arc<dyn SufficiencyPolicy>,
    ) -> Self {
        let qa = RetrievalQa::new(llm.clone(), &config.rag, &config.llm);
        Self {
            config,
            llm,
            search,
            policy,
            qa,
        }
    }

    pub async fn ask(&self, request: AskRequest) -> Result<AskOutcome, ApiError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ApiError::BadRequest(EMPTY_QUERY_MESSAGE.to_string()));
        }

        if request.documents.is_empty() {
            tracing::info!("No documents uploaded; answering from the web");
            let answer = self.web_answer(query).await;
            return Ok(AskOutcome::from_web(answer, false));
        }

        let extracted = documents::extract_all(request.documents).await?;
        if extracted.iter().all(|doc| doc.is_empty()) {
            return match request.mode {
                AskMode::Grounded => Err(ApiError::BadRequest(NO_TEXT_MESSAGE.to_string())),
                AskMode::Fallback => {
                    tracing::warn!("Uploaded documents have no text. Using web search...");
                    let answer = self.web_answer(query).await;
                    Ok(AskOutcome::from_web(answer, true))
                }
            };
        }

        let rag = match request.mode {
            AskMode::Grounded => self.config.rag.grounded(),
            AskMode::Fallback => self.config.rag.clone(),
        };
        let retriever = documents::index(self.llm.as_ref(), &extracted, &rag).await?;
        let candidate = self.qa.answer(&retriever, query).await?;

        if request.mode == AskMode::Fallback && self.policy.is_insufficient(&candidate.text) {
            tracing::warn!("Insufficient answer from documents. Using web search...");
            let answer = self.web_answer(query).await;
            return Ok(AskOutcome::from_web(answer, true));
        }

        let sources = candidate
            .source_documents
            .iter()
            .map(|chunk| SourceRef {
                document: chunk.document.clone(),
                chunk_index: chunk.chunk_index,
            })
            .collect();

        Ok(AskOutcome {
            answer: candidate.text,
            source: AnswerSource::Documents,
            fallback_used: false,
            sources,
        })
    }

    async fn web_answer(&self, query: &str) -> String {
        search::lookup(self.search.as_ref(), query, self.config.search.max_results).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::core::errors::ApiError;
    use crate::llm::{ChatRequest, LlmProvider};
    use crate::search::{SearchError, SearchResultItem, WebSearch};

    /// Fixed chat reply; every text embeds to the same vector.
    pub struct CannedLlm {
        pub reply: String,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        fn name(&self) -> &str {
            "canned"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<String, ApiError> {
            Ok(self.reply.clone())
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|_| vec![1.0, 0.5]).collect())
        }
    }

    pub struct CountingSearch {
        pub calls: AtomicUsize,
        pub items: Vec<SearchResultItem>,
    }

    impl CountingSearch {
        pub fn with_titles(titles: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                items: titles
                    .iter()
                    .map(|t| SearchResultItem {
                        title: t.to_string(),
                        link: format!("https://example.com/{}", t.to_lowercase()),
                    })
                    .collect(),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebSearch for CountingSearch {
        fn name(&self) -> &str {
            "counting"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResultItem>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.clone())
        }
    }
}
