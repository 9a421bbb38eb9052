//! Planning, execution, ranking and comparison for shopping queries.

pub mod compare;
pub mod error;
pub mod executor;
pub mod inference;
pub mod pipeline;
pub mod plan;
pub mod rank;
pub mod worker;

pub use compare::{compare_products, find_better_alternative};
pub use error::AgentError;
pub use executor::{execute_details, execute_plan, paginate};
pub use inference::{ChatClient, Inference};
pub use pipeline::run_query;
pub use plan::{interpret_plan, request_plan, Plan, PlanStep};
pub use rank::{deal_score, rank_items};
pub use worker::{ProcessLauncher, ProcessSession, WorkerLauncher, WorkerSession};
