use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::validation::validate_config;
use crate::fallback::DEFAULT_MARKERS;

pub const CONFIG_PATH_ENV: &str = "DOCQA_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub rag: RagConfig,
    pub fallback: FallbackConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means local development origins.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: Vec::new(),
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API root, without the `/v1` suffix.
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            max_results: 3,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks
    pub chunk_overlap: usize,
    /// Chunk size for grounded-mode questions
    pub grounded_chunk_size: usize,
    pub grounded_chunk_overlap: usize,
    /// Upper bound on chunks indexed per request
    pub max_chunks: usize,
    /// Chunks handed to the model per question
    pub top_k: usize,
    pub embed_batch_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            grounded_chunk_size: 1_000,
            grounded_chunk_overlap: 200,
            max_chunks: 2_000,
            top_k: 4,
            embed_batch_size: 100,
        }
    }
}

impl RagConfig {
    /// Same settings with the grounded chunk profile as the active one.
    pub fn grounded(&self) -> RagConfig {
        RagConfig {
            chunk_size: self.grounded_chunk_size,
            chunk_overlap: self.grounded_chunk_overlap,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub markers: Vec<String>,
    pub min_answer_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            min_answer_chars: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file (if any), then `HOST` / `PORT`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                field: "PORT",
                reason: format!("`{}` is not a valid port", port),
            })?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_sections() {
        let config = AppConfig::from_yaml(
            r#"
fallback:
  min_answer_chars: 12
search:
  max_results: 5
"#,
        )
        .expect("yaml should parse");

        assert_eq!(config.fallback.min_answer_chars, 12);
        assert_eq!(config.fallback.markers.len(), DEFAULT_MARKERS.len());
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.endpoint, "https://google.serper.dev/search");
        assert_eq!(config.rag.chunk_size, 500);
        assert_eq!(config.llm.chat_model, "gpt-3.5-turbo");
    }

    #[test]
    fn grounded_profile_swaps_chunking_only() {
        let config = AppConfig::from_yaml(
            r#"
rag:
  grounded_chunk_size: 800
  top_k: 6
"#,
        )
        .expect("yaml should parse");

        let grounded = config.rag.grounded();
        assert_eq!(grounded.chunk_size, 800);
        assert_eq!(grounded.chunk_overlap, 200);
        assert_eq!(grounded.top_k, 6);
        assert_eq!(config.rag.chunk_size, 500);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = AppConfig::from_yaml("   \n").expect("empty is fine");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.rag.top_k, 4);
    }

    #[test]
    fn from_file_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "server: [not, a, map]").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yml"));
    }
}
