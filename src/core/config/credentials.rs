use std::env;
use std::fmt;

use super::error::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

const REDACT_PLACEHOLDER: &str = "****";

/// Secrets needed by the document question-answering service.
///
/// Only ever read from the process environment (a `.env` file is loaded into
/// the environment by `main` before this runs).
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub serper_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves both keys through `lookup`, reporting every one that is
    /// absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai = read(OPENAI_API_KEY);
        let serper = read(SERPER_API_KEY);

        match (openai, serper) {
            (Some(openai_api_key), Some(serper_api_key)) => Ok(Self {
                openai_api_key,
                serper_api_key,
            }),
            (openai, serper) => {
                let mut missing = Vec::new();
                if openai.is_none() {
                    missing.push(OPENAI_API_KEY);
                }
                if serper.is_none() {
                    missing.push(SERPER_API_KEY);
                }
                Err(ConfigError::MissingCredentials(missing))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &REDACT_PLACEHOLDER)
            .field("serper_api_key", &REDACT_PLACEHOLDER)
            .finish()
    }
}
