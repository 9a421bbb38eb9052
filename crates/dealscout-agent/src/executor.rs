//! Runs a validated plan through one worker session and shapes the result.

use dealscout_core::{Item, ProductDetails, ResultSet, Source};
use dealscout_scraper::{dedup_items, DetailsArgs, ToolCall, PRODUCT_DETAILS};

use crate::error::AgentError;
use crate::plan::Plan;
use crate::rank::rank_items;
use crate::worker::{WorkerLauncher, WorkerSession};

/// Executes every step of `plan` sequentially against a freshly launched
/// worker, then dedups, ranks and paginates the merged items.
///
/// The worker is closed on every path out of this function. A step whose
/// response carries `isError` is logged and skipped; the plan fails only
/// when every item-producing step failed.
///
/// # Errors
///
/// - Any launch, I/O, timeout or decode error from the worker session.
/// - [`AgentError::AllStepsFailed`] when no step succeeded.
pub async fn execute_plan<L: WorkerLauncher>(
    launcher: &L,
    plan: &Plan,
) -> Result<ResultSet, AgentError> {
    let mut session = launcher.launch().await?;
    let collected = run_steps(&mut session, plan).await;
    session.close().await;

    let items = collected?;
    let merged = dedup_items(items);
    tracing::info!(items = merged.len(), "plan executed");
    Ok(paginate(rank_items(merged), plan.display_limit))
}

async fn run_steps<S: WorkerSession>(
    session: &mut S,
    plan: &Plan,
) -> Result<Vec<Item>, AgentError> {
    let mut items = Vec::new();
    let mut attempted = 0usize;
    let mut failed = 0usize;

    for (index, step) in plan.steps.iter().enumerate() {
        if !step.yields_items() {
            tracing::debug!(step = index, tool = %step.tool, "step produces no items; skipped");
            continue;
        }
        attempted += 1;

        let args = serde_json::to_value(&step.args).map_err(|source| AgentError::Decode {
            context: format!("step {index} args"),
            source,
        })?;
        let call = ToolCall {
            tool: step.tool.clone(),
            args,
        };
        let response = session.call_tool(&call).await?;

        if response.is_error {
            failed += 1;
            tracing::warn!(
                step = index,
                search = %step.args.search,
                error = response.error.as_deref().unwrap_or("unspecified"),
                "plan step failed"
            );
            continue;
        }

        tracing::debug!(
            step = index,
            search = %step.args.search,
            count = response.items.len(),
            "plan step finished"
        );
        items.extend(response.items);
    }

    if attempted > 0 && failed == attempted {
        return Err(AgentError::AllStepsFailed { steps: attempted });
    }
    Ok(items)
}

/// Fetches one product's details through a short-lived worker.
///
/// # Errors
///
/// - Any launch, I/O, timeout or decode error from the worker session.
/// - [`AgentError::ToolFailed`] when the worker reports an error or answers
///   without details.
pub async fn execute_details<L: WorkerLauncher>(
    launcher: &L,
    url: &str,
    platform: Source,
) -> Result<ProductDetails, AgentError> {
    let args = serde_json::to_value(DetailsArgs {
        url: url.to_owned(),
        platform,
    })
    .map_err(|source| AgentError::Decode {
        context: format!("{PRODUCT_DETAILS} args"),
        source,
    })?;
    let call = ToolCall {
        tool: PRODUCT_DETAILS.to_owned(),
        args,
    };

    let mut session = launcher.launch().await?;
    let reply = session.call_tool(&call).await;
    session.close().await;

    let response = reply?;
    match (response.is_error, response.details) {
        (false, Some(details)) => Ok(details),
        _ => Err(AgentError::ToolFailed {
            tool: PRODUCT_DETAILS.to_owned(),
            message: response
                .error
                .unwrap_or_else(|| "response carried no details".to_owned()),
        }),
    }
}

/// Splits ranked items at `display_limit` into visible and held-back parts.
#[must_use]
pub fn paginate(mut ranked: Vec<Item>, display_limit: usize) -> ResultSet {
    let total_available = ranked.len();
    let held_back_items = ranked.split_off(display_limit.min(total_available));
    ResultSet {
        count: ranked.len(),
        items: ranked,
        display_limit,
        has_more: !held_back_items.is_empty(),
        held_back_items,
        total_available,
    }
}
