use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use dealscout_agent::execute_details;
use dealscout_core::Source;
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct DetailsBody {
    url: String,
    platform: Source,
}

/// `POST /api/details`: feature bullets and description for one product page.
pub(super) async fn product_details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<DetailsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) =
        body.map_err(|e| ApiError::validation(e.body_text()).with_request_id(&req_id))?;
    let url = body.url.trim();
    if url.is_empty() {
        return Err(ApiError::validation("url is required").with_request_id(&req_id));
    }

    let details = execute_details(&state.launcher, url, body.platform)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, url, error = %e, "details lookup failed");
            ApiError::new("upstream_error", "failed to fetch product details")
                .with_request_id(&req_id)
        })?;

    Ok(ApiResponse::ok(details))
}
