use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Secret for the inference endpoint. Never handed to worker processes.
pub const INFERENCE_API_KEY_VAR: &str = "DEALSCOUT_INFERENCE_API_KEY";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let inference_api_key = lookup(INFERENCE_API_KEY_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("DEALSCOUT_ENV", "development"))?;
    let bind_addr = parse_addr("DEALSCOUT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("DEALSCOUT_LOG_LEVEL", "info");
    let cors_origins = or_default("DEALSCOUT_CORS_ORIGINS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let inference_base_url = or_default(
        "DEALSCOUT_INFERENCE_BASE_URL",
        "https://api.groq.com/openai/v1",
    );
    let inference_model = or_default("DEALSCOUT_INFERENCE_MODEL", "openai/gpt-oss-120b");
    let inference_timeout_secs = parse_u64("DEALSCOUT_INFERENCE_TIMEOUT_SECS", "60")?;

    let worker_program = or_default("DEALSCOUT_WORKER_PROGRAM", "dealscout-cli");
    let worker_timeout_secs = parse_u64("DEALSCOUT_WORKER_TIMEOUT_SECS", "120")?;
    let page_timeout_secs = parse_u64("DEALSCOUT_PAGE_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DEALSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("DEALSCOUT_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("DEALSCOUT_RETRY_BACKOFF_BASE_SECS", "1")?;

    let amazon_base_url = or_default("DEALSCOUT_AMAZON_BASE_URL", "https://www.amazon.in");
    let flipkart_base_url = or_default("DEALSCOUT_FLIPKART_BASE_URL", "https://www.flipkart.com");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        cors_origins,
        inference_api_key,
        inference_base_url,
        inference_model,
        inference_timeout_secs,
        worker_program,
        worker_timeout_secs,
        page_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        amazon_base_url,
        flipkart_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DEALSCOUT_ENV".to_string(),
            reason: format!("expected development, test or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
