use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use dealscout_agent::run_query;
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct QueryBody {
    #[serde(default)]
    query: Option<String>,
}

const QUERY_REQUIRED: &str = "Query is required.";

/// `POST /api/get`: plans, scrapes, ranks and paginates one query.
pub(super) async fn get_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<QueryBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = body
        .ok()
        .and_then(|Json(body)| body.query)
        .map(|q| q.trim().to_owned())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation(QUERY_REQUIRED).with_request_id(&req_id))?;

    tracing::info!(request_id = %req_id.0, query = %query, "query received");
    let results = run_query(&*state.inference, &state.launcher, &query, &state.defaults)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "query pipeline failed");
            ApiError::new("internal_error", "failed to execute plan").with_request_id(&req_id)
        })?;

    Ok(ApiResponse::ok(results))
}

#[cfg(all(test, unix))]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::test_support::{app, post_json, state};

    fn completion(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn blank_or_missing_query_is_rejected() {
        for body in [json!({}), json!({"query": "   "}), json!({"query": 7})] {
            let (status, json) =
                post_json(app(state("http://127.0.0.1:9", "exit 0")), "/api/get", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["success"], false);
            assert_eq!(json["message"], "Query is required.");
        }
    }

    #[tokio::test]
    async fn answers_with_ranked_result_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"[{"tool":"product-scraper","args":{"search":"usb hub"},"displayLimit":1}]"#,
            )))
            .mount(&server)
            .await;

        let worker = r#"read line; echo '{"isError":false,"count":2,"items":[{"asin":"B1","title":"Hub one","platform":"amazon","price":500,"rating":4.0},{"asin":"F1","title":"Hub two","platform":"flipkart","price":450,"rating":4.6}]}'"#;
        let (status, json) = post_json(
            app(state(&server.uri(), worker)),
            "/api/get",
            &json!({"query": "usb hub"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["items"][0]["asin"], "F1");
        assert_eq!(json["data"]["heldBackItems"][0]["asin"], "B1");
        assert_eq!(json["data"]["totalAvailable"], 2);
        assert_eq!(json["data"]["hasMore"], true);
    }

    #[tokio::test]
    async fn pipeline_failure_is_a_generic_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("no idea")))
            .mount(&server)
            .await;

        let (status, json) = post_json(
            app(state(&server.uri(), "exit 0")),
            "/api/get",
            &json!({"query": "laptop"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "failed to execute plan");
    }
}
