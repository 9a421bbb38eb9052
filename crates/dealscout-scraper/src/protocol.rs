//! Line-delimited JSON protocol spoken by the extraction worker process.
//!
//! The coordinator writes one [`ToolCall`] per line on the worker's stdin
//! and reads one [`ToolResponse`] per line from its stdout. Failures are
//! reported in-band with `isError: true`, never by closing the stream.

use dealscout_core::{ExtractionRequest, Item, ProductDetails, Source};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::search::Scraper;

pub const PRODUCT_SCRAPER: &str = "product-scraper";
pub const PRODUCT_DETAILS: &str = "product-details";

/// Tool identifiers the worker answers to.
pub const REGISTERED_TOOLS: [&str; 2] = [PRODUCT_SCRAPER, PRODUCT_DETAILS];

#[must_use]
pub fn is_registered_tool(tool: &str) -> bool {
    REGISTERED_TOOLS.contains(&tool)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub is_error: bool,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    #[must_use]
    pub fn items(items: Vec<Item>) -> Self {
        Self {
            is_error: false,
            count: items.len(),
            items,
            details: None,
            error: None,
        }
    }

    #[must_use]
    pub fn details(details: ProductDetails) -> Self {
        Self {
            is_error: false,
            items: Vec::new(),
            count: 0,
            details: Some(details),
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            items: Vec::new(),
            count: 0,
            details: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsArgs {
    pub url: String,
    pub platform: Source,
}

/// Runs one tool call against `scraper`.
pub async fn dispatch(scraper: &Scraper, call: ToolCall) -> ToolResponse {
    match call.tool.as_str() {
        PRODUCT_SCRAPER => {
            let request: ExtractionRequest = match serde_json::from_value(call.args) {
                Ok(request) => request,
                Err(e) => return ToolResponse::error(format!("invalid {PRODUCT_SCRAPER} args: {e}")),
            };
            match scraper.search(&request).await {
                Ok(outcome) => ToolResponse::items(outcome.items),
                Err(e) => ToolResponse::error(e.to_string()),
            }
        }
        PRODUCT_DETAILS => {
            let args: DetailsArgs = match serde_json::from_value(call.args) {
                Ok(args) => args,
                Err(e) => return ToolResponse::error(format!("invalid {PRODUCT_DETAILS} args: {e}")),
            };
            match scraper.details(&args.url, args.platform).await {
                Ok(details) => ToolResponse::details(details),
                Err(e) => ToolResponse::error(e.to_string()),
            }
        }
        other => ToolResponse::error(format!("unknown tool: {other}")),
    }
}

/// Answers tool calls line by line until `reader` reaches end of input.
///
/// # Errors
///
/// Returns an I/O error if reading a request or writing a response fails.
pub async fn serve<R, W>(scraper: &Scraper, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => {
                tracing::info!(tool = %call.tool, "tool call received");
                dispatch(scraper, call).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed tool call");
                ToolResponse::error(format!("malformed tool call: {e}"))
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    tracing::debug!("worker input closed");
    Ok(())
}
