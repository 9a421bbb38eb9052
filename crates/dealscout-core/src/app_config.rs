use std::net::SocketAddr;

use crate::config::INFERENCE_API_KEY_VAR;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    /// Only the query pipeline needs this; scraping and details run without it.
    pub inference_api_key: Option<String>,
    pub inference_base_url: String,
    pub inference_model: String,
    pub inference_timeout_secs: u64,
    pub worker_program: String,
    pub worker_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub amazon_base_url: String,
    pub flipkart_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cors_origins", &self.cors_origins)
            .field(
                "inference_api_key",
                &self.inference_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("inference_base_url", &self.inference_base_url)
            .field("inference_model", &self.inference_model)
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("worker_program", &self.worker_program)
            .field("worker_timeout_secs", &self.worker_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("amazon_base_url", &self.amazon_base_url)
            .field("flipkart_base_url", &self.flipkart_base_url)
            .finish()
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no inference key was configured.
    pub fn require_inference_key(&self) -> Result<&str, ConfigError> {
        self.inference_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(INFERENCE_API_KEY_VAR.to_string()))
    }
}
