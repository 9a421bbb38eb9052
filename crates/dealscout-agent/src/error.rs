use std::time::Duration;

use thiserror::Error;

/// Errors raised between query text and a finished result set.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The inference output did not contain a usable plan.
    #[error("could not parse plan: {reason}")]
    PlanParse { raw: String, reason: String },

    /// A plan step named a tool no worker provides.
    #[error("unknown tool in plan: {tool}")]
    UnknownTool { tool: String },

    #[error(transparent)]
    Config(#[from] dealscout_core::ConfigError),

    #[error("inference request failed: {0}")]
    Inference(#[from] reqwest::Error),

    /// The inference endpoint answered, but not with a completion.
    #[error("inference response unusable: {0}")]
    InferenceResponse(String),

    #[error("worker I/O failed during {context}: {source}")]
    WorkerIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker did not answer {tool} within {timeout:?}")]
    WorkerTimeout { tool: String, timeout: Duration },

    #[error("worker closed its output before answering {tool}")]
    WorkerClosed { tool: String },

    /// A worker response line was not a valid tool response.
    #[error("JSON decode error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single tool call came back with an error payload.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// Every step came back with an error payload.
    #[error("all {steps} plan steps failed")]
    AllStepsFailed { steps: usize },
}
