//! Query text in, ranked and paginated result set out.

use dealscout_core::{ExtractionDefaults, ResultSet};

use crate::error::AgentError;
use crate::executor::execute_plan;
use crate::inference::Inference;
use crate::plan::request_plan;
use crate::worker::WorkerLauncher;

/// Plans `query` with `inference`, then executes the plan on a fresh worker.
///
/// # Errors
///
/// Any planning or execution error. Callers surface all of them as one
/// generic failure; the underlying cause is logged here.
pub async fn run_query<I, L>(
    inference: &I,
    launcher: &L,
    query: &str,
    defaults: &ExtractionDefaults,
) -> Result<ResultSet, AgentError>
where
    I: Inference,
    L: WorkerLauncher,
{
    let outcome = async {
        let plan = request_plan(inference, query, defaults).await?;
        tracing::info!(
            query,
            steps = plan.steps.len(),
            display_limit = plan.display_limit,
            "plan ready"
        );
        execute_plan(launcher, &plan).await
    }
    .await;

    match &outcome {
        Ok(results) => tracing::info!(
            query,
            shown = results.count,
            total = results.total_available,
            "query answered"
        ),
        Err(AgentError::PlanParse { raw, reason }) => {
            tracing::error!(query, reason = %reason, raw = %raw, "plan could not be parsed");
        }
        Err(e) => tracing::error!(query, error = %e, "query failed"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::worker::WorkerSession;
    use dealscout_core::{Item, Source};
    use dealscout_scraper::{ToolCall, ToolResponse};

    struct Planner(&'static str);

    impl Inference for Planner {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AgentError> {
            Ok(self.0.to_owned())
        }
    }

    /// Answers every call with the same items and records the args it saw.
    #[derive(Clone, Default)]
    struct EchoLauncher {
        seen: Arc<Mutex<Vec<ToolCall>>>,
        closed: Arc<Mutex<bool>>,
    }

    struct EchoSession(EchoLauncher);

    impl WorkerLauncher for EchoLauncher {
        type Session = EchoSession;

        async fn launch(&self) -> Result<EchoSession, AgentError> {
            Ok(EchoSession(self.clone()))
        }
    }

    impl WorkerSession for EchoSession {
        async fn call_tool(&mut self, call: &ToolCall) -> Result<ToolResponse, AgentError> {
            self.0.seen.lock().expect("lock").push(call.clone());
            let items = (1..=6)
                .map(|n| {
                    let mut item = Item::new(Source::Amazon, format!("B0{n}"), format!("Keyboard {n}"));
                    item.rating = Some(f64::from(n) * 0.5);
                    item.price = Some(2_000.0);
                    item
                })
                .collect();
            Ok(ToolResponse::items(items))
        }

        async fn close(self) {
            *self.0.closed.lock().expect("lock") = true;
        }
    }

    #[tokio::test]
    async fn superlative_query_shows_three_best_and_holds_back_rest() {
        let planner = Planner(
            r#"[{"tool":"product-scraper","args":{"search":"gaming keyboard","maxPrice":3500},"displayLimit":5}]"#,
        );
        let launcher = EchoLauncher::default();

        let results = run_query(
            &planner,
            &launcher,
            "best gaming keyboard under 3500",
            &ExtractionDefaults::default(),
        )
        .await
        .expect("results");

        assert_eq!(results.display_limit, 3);
        let ids: Vec<_> = results.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["B06", "B05", "B04"]);
        assert!(results.items.iter().all(|i| i.is_best_deal));
        assert_eq!(results.held_back_items.len(), 3);
        assert!(results.has_more);

        let seen = launcher.seen.lock().expect("lock");
        assert_eq!(seen[0].args["minPrice"], 1_750.0);
        assert_eq!(seen[0].args["maxPrice"], 3_500.0);
        assert!(*launcher.closed.lock().expect("lock"));
    }

    #[tokio::test]
    async fn unparsable_plan_never_launches_a_worker() {
        let planner = Planner("no plan today");
        let launcher = EchoLauncher::default();

        let err = run_query(&planner, &launcher, "mouse", &ExtractionDefaults::default())
            .await
            .expect_err("parse failure");
        assert!(matches!(err, AgentError::PlanParse { .. }), "got: {err:?}");
        assert!(launcher.seen.lock().expect("lock").is_empty());
    }
}
