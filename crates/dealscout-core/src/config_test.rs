use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with the inference key populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("DEALSCOUT_INFERENCE_API_KEY", "gsk-test");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "DEALSCOUT_ENV"));
}

#[test]
fn build_app_config_succeeds_without_inference_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inference_api_key, None);
    assert!(
        matches!(cfg.require_inference_key(), Err(ConfigError::MissingEnvVar(ref v)) if v == "DEALSCOUT_INFERENCE_API_KEY"),
        "expected MissingEnvVar(DEALSCOUT_INFERENCE_API_KEY)"
    );
}

#[test]
fn build_app_config_treats_blank_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("DEALSCOUT_INFERENCE_API_KEY", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inference_api_key, None);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("DEALSCOUT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCOUT_BIND_ADDR"),
        "expected InvalidEnvVar(DEALSCOUT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_non_numeric_timeout() {
    let mut map = full_env();
    map.insert("DEALSCOUT_PAGE_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCOUT_PAGE_TIMEOUT_SECS")
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.cors_origins.is_empty());
    assert_eq!(cfg.require_inference_key().unwrap(), "gsk-test");
    assert_eq!(cfg.inference_base_url, "https://api.groq.com/openai/v1");
    assert_eq!(cfg.inference_model, "openai/gpt-oss-120b");
    assert_eq!(cfg.inference_timeout_secs, 60);
    assert_eq!(cfg.worker_program, "dealscout-cli");
    assert_eq!(cfg.worker_timeout_secs, 120);
    assert_eq!(cfg.page_timeout_secs, 30);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
    assert_eq!(cfg.amazon_base_url, "https://www.amazon.in");
    assert_eq!(cfg.flipkart_base_url, "https://www.flipkart.com");
}

#[test]
fn build_app_config_splits_cors_origins() {
    let mut map = full_env();
    map.insert(
        "DEALSCOUT_CORS_ORIGINS",
        "http://localhost:5173, https://example.github.io,,",
    );
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.cors_origins,
        vec![
            "http://localhost:5173".to_string(),
            "https://example.github.io".to_string()
        ]
    );
}

#[test]
fn debug_output_redacts_inference_key() {
    let cfg = build_app_config(lookup_from_map(&full_env())).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("gsk-test"));
    assert!(rendered.contains("[redacted]"));
}
