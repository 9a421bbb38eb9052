//! Shared domain types and configuration for dealscout.

pub mod app_config;
pub mod config;
pub mod items;
pub mod request;
pub mod results;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, INFERENCE_API_KEY_VAR};
pub use items::{ComparisonVerdict, Item, ProductDetails, Source};
pub use request::{ExtractionDefaults, ExtractionRequest, SourceSelector};
pub use results::ResultSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("search term must not be empty")]
    EmptySearchTerm,

    #[error("unknown source: {0}")]
    UnknownSource(String),
}
