use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use dealscout_agent::{compare_products, find_better_alternative};
use dealscout_core::Item;
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CompareBody {
    products: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlternativeBody {
    product: Item,
    #[serde(default)]
    candidates: Vec<Item>,
}

fn invalid_body(rejection: &JsonRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

/// `POST /api/compare`: qualitative verdicts for up to three products.
pub(super) async fn compare(
    State(state): State<AppState>,
    body: Result<Json<CompareBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| invalid_body(&e))?;
    let verdicts = compare_products(&*state.inference, &body.products).await;
    Ok(ApiResponse::ok(verdicts))
}

/// `POST /api/alternative`: a cheaper candidate rated at least as well, or null.
pub(super) async fn alternative(
    body: Result<Json<AlternativeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| invalid_body(&e))?;
    let better = find_better_alternative(&body.product, &body.candidates).cloned();
    Ok(ApiResponse::ok(better))
}
