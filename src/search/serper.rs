use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{SearchError, SearchResultItem, WebSearch};
use crate::core::config::SearchConfig;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Serper.dev Google search client.
#[derive(Clone)]
pub struct SerperSearch {
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
    client: Client,
}

impl SerperSearch {
    pub fn new(config: &SearchConfig, api_key: String) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> SearchError {
        if err.is_timeout() {
            SearchError::Timeout(self.timeout_secs)
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| self.transport_error(e))?;
        Ok(parse_organic(&payload))
    }
}

fn parse_organic(payload: &Value) -> Vec<SearchResultItem> {
    let Some(items) = payload.get("organic").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let link = item.get("link").and_then(|v| v.as_str()).unwrap_or("");
        if title.is_empty() || link.is_empty() {
            continue;
        }
        results.push(SearchResultItem {
            title: title.to_string(),
            link: link.to_string(),
        });
    }
    results
}
