//! Web search lookup used when document answers fall short.
//!
//! [`lookup`] never fails: upstream errors are rendered into the answer text
//! so the caller always has something to display.

mod serper;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::errors::ApiError;

pub use serper::SerperSearch;

const RESULT_BULLET: &str = "🔹";
pub const NO_RESULTS_MESSAGE: &str = "❌ No relevant web results found.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search API returned status {0}")]
    Status(u16),
    #[error("search timed out after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Transport(String),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Timeout(_) => ApiError::UpstreamTimeout(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// provider name for logs
    fn name(&self) -> &str;

    /// results in the provider's ranking order
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SearchError>;
}

/// Runs one search and renders it for display.
pub async fn lookup(searcher: &dyn WebSearch, query: &str, max_results: usize) -> String {
    tracing::info!("Searching the web with {}", searcher.name());
    match searcher.search(query).await {
        Ok(items) => format_results(&items, max_results),
        Err(err) => {
            tracing::warn!("Web search via {} failed: {}", searcher.name(), err);
            format_error(&err)
        }
    }
}

/// Keeps the first `max_results` items in input order, one bullet entry each.
pub fn format_results(items: &[SearchResultItem], max_results: usize) -> String {
    if items.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    items
        .iter()
        .take(max_results)
        .map(|item| format!("{} **{}**\n{}", RESULT_BULLET, item.title, item.link))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_error(err: &SearchError) -> String {
    match err {
        SearchError::Status(code) => format!("❌ Serper API error: {}", code),
        SearchError::Timeout(secs) => format!("❌ Web search timed out after {}s", secs),
        SearchError::Transport(msg) => format!("❌ Error fetching web results: {}", msg),
    }
}
