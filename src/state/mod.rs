use std::sync::Arc;

use crate::core::config::{AppConfig, Credentials};
use crate::fallback::{MarkerPolicy, SufficiencyPolicy};
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::pipeline::AskService;
use crate::search::{SerperSearch, WebSearch};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Immutable after startup; collaborators sit behind trait objects so tests
/// can swap them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ask: AskService,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        llm: Arc<dyn LlmProvider>,
        search: Arc<dyn WebSearch>,
        policy: Arc<dyn SufficiencyPolicy>,
    ) -> Arc<Self> {
        let ask = AskService::new(config.clone(), llm, search, policy);
        Arc::new(AppState { config, ask })
    }

    /// Wires the production collaborators:
    /// 1. OpenAI-compatible chat + embeddings
    /// 2. Serper web search
    /// 3. Marker-based sufficiency policy from `fallback.*`
    pub fn initialize(
        config: AppConfig,
        credentials: Credentials,
    ) -> Result<Arc<Self>, InitializationError> {
        let llm = OpenAiProvider::new(&config.llm, credentials.openai_api_key)
            .map_err(|e| InitializationError::Llm(e.into()))?;
        let search = SerperSearch::new(&config.search, credentials.serper_api_key)
            .map_err(|e| InitializationError::Search(e.into()))?;
        let policy = MarkerPolicy::from_config(&config.fallback);

        tracing::info!(
            "Fallback policy: {} markers, min {} chars",
            policy.markers().len(),
            policy.min_answer_chars()
        );

        Ok(Self::new(
            Arc::new(config),
            Arc::new(llm),
            Arc::new(search),
            Arc::new(policy),
        ))
    }
}
