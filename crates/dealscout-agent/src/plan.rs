//! Turns inference output into an executable, validated plan.
//!
//! The inference capability is asked for a JSON array of
//! `{tool, args, displayLimit?}` steps. What comes back is often wrapped in
//! code fences or prose, so the text is unwrapped first and then read
//! leniently: numbers may arrive as strings, and a step without a search
//! term falls back to the user's query. Anything that still is not a list of
//! steps is a [`AgentError::PlanParse`] carrying the raw text.
//!
//! After parsing, deterministic rules override the model: the display limit
//! is clamped, superlative queries are capped at a short list, and a lone
//! maximum price gets a synthesized floor.

use std::sync::LazyLock;

use dealscout_core::{ExtractionDefaults, ExtractionRequest, SourceSelector};
use dealscout_scraper::{is_registered_tool, PRODUCT_SCRAPER};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::AgentError;
use crate::inference::Inference;

pub const DEFAULT_DISPLAY_LIMIT: usize = 5;
pub const MAX_DISPLAY_LIMIT: usize = 5;
/// Display cap for queries asking for the best / top items.
pub const SUPERLATIVE_DISPLAY_LIMIT: usize = 3;
/// Synthesized minimum price as a fraction of a lone maximum price.
pub const SMART_FLOOR_RATIO: f64 = 0.5;

static SUPERLATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(best|top|finest|greatest|leading|premium|ultimate)\b")
        .expect("valid superlative regex")
});
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*\s*|\s*```$").expect("valid fence regex"));

pub const PLANNER_SYSTEM_PROMPT: &str = r#"You plan product searches for Indian e-commerce sites.
Reply with ONLY a JSON array of steps, no prose. Each step is:
{"tool": "product-scraper", "args": {"search": string, "limit": number, "minPrice": number, "maxPrice": number, "minRating": number, "platform": "all" | "amazon" | "flipkart"}, "displayLimit": number}
Prices are in INR. Omit any arg the user did not constrain. Use one step per distinct product the user asks for.
displayLimit is how many results the user wants to see (1-5)."#;

/// One validated step of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub tool: String,
    pub args: ExtractionRequest,
}

impl PlanStep {
    /// Whether the step produces items for the result set.
    #[must_use]
    pub fn yields_items(&self) -> bool {
        self.tool == PRODUCT_SCRAPER
    }
}

/// Validated plan plus the resolved display limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub display_limit: usize,
}

/// Asks `inference` for a plan for `query` and interprets the answer.
///
/// # Errors
///
/// Propagates inference failures, plus everything [`interpret_plan`] rejects.
pub async fn request_plan<I: Inference>(
    inference: &I,
    query: &str,
    defaults: &ExtractionDefaults,
) -> Result<Plan, AgentError> {
    let raw = inference.complete(PLANNER_SYSTEM_PROMPT, query).await?;
    interpret_plan(&raw, query, defaults)
}

/// Parses, validates and post-processes raw inference output.
///
/// # Errors
///
/// - [`AgentError::PlanParse`] when no step list can be read from `raw`.
/// - [`AgentError::UnknownTool`] when any step names an unregistered tool;
///   the whole plan is rejected.
pub fn interpret_plan(
    raw: &str,
    query: &str,
    defaults: &ExtractionDefaults,
) -> Result<Plan, AgentError> {
    let parse_error = |reason: &str| AgentError::PlanParse {
        raw: raw.to_owned(),
        reason: reason.to_owned(),
    };

    let payload = parse_payload(raw).ok_or_else(|| parse_error("no JSON payload found"))?;
    let raw_steps =
        step_values(payload).ok_or_else(|| parse_error("payload is not a list of steps"))?;
    if raw_steps.is_empty() {
        return Err(parse_error("plan has no steps"));
    }

    let mut steps = Vec::with_capacity(raw_steps.len());
    let mut display_hint = None;
    for (index, value) in raw_steps.iter().enumerate() {
        let Value::Object(step) = value else {
            return Err(parse_error("step is not an object"));
        };
        let tool = step
            .get("tool")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| parse_error("step has no tool"))?;
        if !is_registered_tool(tool) {
            return Err(AgentError::UnknownTool {
                tool: tool.to_owned(),
            });
        }

        let args = step.get("args").and_then(Value::as_object);
        if index == 0 {
            display_hint = step
                .get("displayLimit")
                .or_else(|| args.and_then(|a| a.get("displayLimit")))
                .and_then(lenient_f64);
        }

        let mut request = build_request(args, query, defaults);
        apply_smart_floor(&mut request);
        steps.push(PlanStep {
            tool: tool.to_owned(),
            args: request,
        });
    }

    let display_limit = resolve_display_limit(display_hint, query);
    tracing::debug!(steps = steps.len(), display_limit, "plan interpreted");
    Ok(Plan {
        steps,
        display_limit,
    })
}

/// Strips fences and surrounding prose, returning the parsed JSON payload.
pub(crate) fn parse_payload(raw: &str) -> Option<Value> {
    let unfenced = CODE_FENCE.replace_all(raw.trim(), "");
    let text = unfenced.trim();
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Accepts a bare array, a single step object, or an object wrapping an array.
///
/// When the wrapper holds several arrays, one whose entries name a `tool`
/// wins over any other non-empty array of objects.
fn step_values(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(steps) => Some(steps),
        Value::Object(map) if map.contains_key("tool") => Some(vec![Value::Object(map)]),
        Value::Object(map) => {
            let mut fallback = None;
            for (_, value) in map {
                let Value::Array(steps) = value else { continue };
                if steps.is_empty() || !steps.iter().all(Value::is_object) {
                    continue;
                }
                if steps.iter().any(|step| step.get("tool").is_some()) {
                    return Some(steps);
                }
                fallback.get_or_insert(steps);
            }
            fallback
        }
        _ => None,
    }
}

fn build_request(
    args: Option<&Map<String, Value>>,
    query: &str,
    defaults: &ExtractionDefaults,
) -> ExtractionRequest {
    let mut request = ExtractionRequest::new(query.trim(), defaults);
    let Some(args) = args else {
        return request;
    };

    if let Some(search) = args
        .get("search")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        search.clone_into(&mut request.search);
    }
    request.limit = defaults.resolve_limit(args.get("limit").and_then(lenient_usize));
    if let Some(min) = args.get("minPrice").and_then(lenient_f64) {
        request.min_price = Some(min);
    }
    if let Some(max) = args
        .get("maxPrice")
        .and_then(lenient_f64)
        .filter(|max| *max > 0.0)
    {
        request.max_price = Some(max);
    }
    if let Some(rating) = args.get("minRating").and_then(lenient_f64) {
        request.min_rating = Some(rating);
    }
    if let Some(platform) = args.get("platform").and_then(Value::as_str).and_then(parse_platform) {
        request.platform = platform;
    }
    request
}

fn parse_platform(raw: &str) -> Option<SourceSelector> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" | "both" | "" => Some(SourceSelector::All),
        "amazon" => Some(SourceSelector::Amazon),
        "flipkart" => Some(SourceSelector::Flipkart),
        _ => None,
    }
}

/// A number, or a string holding one.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_usize(value: &Value) -> Option<usize> {
    lenient_f64(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
}

/// Synthesizes `minPrice = maxPrice * 0.5` when a maximum price comes
/// without a meaningful minimum.
pub fn apply_smart_floor(request: &mut ExtractionRequest) {
    let Some(max) = request.max_price.filter(|m| m.is_finite() && *m > 0.0) else {
        return;
    };
    if request.min_price.is_none_or(|min| min <= 0.0) {
        request.min_price = Some(max * SMART_FLOOR_RATIO);
    }
}

/// Whether the query asks for the best / top items.
#[must_use]
pub fn has_superlative(query: &str) -> bool {
    SUPERLATIVE.is_match(query)
}

/// Clamps the display-limit hint to `[1, 5]` (missing or invalid means 5),
/// then caps superlative queries at 3.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resolve_display_limit(hint: Option<f64>, query: &str) -> usize {
    let limit = match hint {
        Some(n) if n.is_finite() && n >= 1.0 => (n.trunc() as usize).min(MAX_DISPLAY_LIMIT),
        _ => DEFAULT_DISPLAY_LIMIT,
    };
    if has_superlative(query) {
        limit.min(SUPERLATIVE_DISPLAY_LIMIT)
    } else {
        limit
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
