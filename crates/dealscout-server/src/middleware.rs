use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by every `/api` route except health.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused; otherwise a `UUIDv4` is
/// generated. The ID is stored as a [`RequestId`] extension and echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;

    if window.started_at.elapsed() >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        drop(window);
        tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
        let error = ApiError::rate_limited();
        return match req.extensions().get::<RequestId>() {
            Some(id) => error.with_request_id(id),
            None => error,
        }
        .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn limited_app(max_requests: usize) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(
                RateLimitState::new(max_requests, Duration::from_secs(60)),
                enforce_rate_limit,
            ))
    }

    fn ping() -> Request {
        Request::builder()
            .uri("/ping")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn rate_limit_rejects_requests_beyond_the_window_budget() {
        let app = limited_app(2);

        for _ in 0..2 {
            let res = app.clone().oneshot(ping()).await.expect("response");
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = app.oneshot(ping()).await.expect("response");
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn request_id_is_echoed_or_generated() {
        let app = Router::new()
            .route(
                "/id",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(axum::middleware::from_fn(request_id));

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/id")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.headers()["x-request-id"], "req-42");

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/id")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let generated = res.headers()["x-request-id"].to_str().expect("ascii");
        assert!(Uuid::parse_str(generated).is_ok());
    }
}
