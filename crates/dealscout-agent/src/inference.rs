//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! The pipeline treats inference as an opaque capability: a system prompt
//! and a user prompt go in, free text comes out. [`Inference`] is the seam
//! tests replace with canned answers.

use std::future::Future;
use std::time::Duration;

use dealscout_core::AppConfig;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Sampling temperature for every call. Plans must be reproducible enough
/// to parse, so this stays low.
const TEMPERATURE: f32 = 0.2;

/// Anything that can turn a prompt pair into text.
pub trait Inference: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, AgentError>> + Send;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client with bearer-token auth.
///
/// [`ChatClient::from_config`] is the production constructor;
/// [`ChatClient::with_base_url`] points at a mock server in tests.
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`AgentError::Inference`] if the HTTP client cannot be built,
    /// or [`AgentError::InferenceResponse`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dealscout/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| {
                AgentError::InferenceResponse(format!("invalid base URL '{base_url}': {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }

    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when no API key is configured,
    /// otherwise the same as [`ChatClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        Self::with_base_url(
            config.require_inference_key()?,
            &config.inference_model,
            config.inference_timeout_secs,
            &config.inference_base_url,
        )
    }
}

impl Inference for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AgentError::InferenceResponse("no completion content".to_owned()))?;

        tracing::debug!(model = %self.model, chars = content.len(), "inference completed");
        Ok(content)
    }
}
