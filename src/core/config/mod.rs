pub mod credentials;
pub mod error;
pub mod settings;
pub mod validation;

pub use credentials::Credentials;
pub use error::ConfigError;
pub use settings::{
    AppConfig, FallbackConfig, LlmConfig, LoggingConfig, RagConfig, SearchConfig, ServerConfig,
};
