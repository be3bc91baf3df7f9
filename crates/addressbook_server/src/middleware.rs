//! Request-wrapping error middleware.
//!
//! # Responsibility
//! - Tag every request with an `x-request-id`, keeping one the client sent,
//!   and echo it on the response.
//! - Log every request once under that id.
//! - Pass structured client errors (4xx) through unchanged; give the
//!   router's bare 404/405 responses the same `detail` body.
//! - Collapse every server-side failure, panics included, into the fixed
//!   `{"detail":"Internal Server Error"}` 500 response.
//!
//! # Invariants
//! - No internal error message ever reaches a response body.

use crate::error::{internal_server_error, ApiError, ErrorReport};
use addressbook_core::logging::sanitize_message;
use axum::extract::Request;
use axum::http::header::ALLOW;
use axum::http::StatusCode;
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use log::{error, info, warn};
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

const MAX_PANIC_DETAIL_CHARS: usize = 160;

/// Generates a v4 uuid for requests that arrive without an id.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Wraps every route registered on `router` with panic capture and the
/// error middleware. Call after all routes and fallbacks are added.
pub fn install<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(handle_errors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Logs the outcome of one request and enforces the 5xx body policy.
pub async fn handle_errors(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let detail = response
        .extensions()
        .get::<ErrorReport>()
        .map(|report| report.message.clone());
    let duration_ms = started_at.elapsed().as_millis();

    if status.is_server_error() {
        error!(
            "event=http_request module=http status=error request_id={} method={} path={} http_status={} duration_ms={} error={}",
            request_id,
            method,
            path,
            status.as_u16(),
            duration_ms,
            detail.as_deref().unwrap_or("unreported server failure")
        );
        internal_server_error()
    } else if status.is_client_error() {
        warn!(
            "event=http_request module=http status=rejected request_id={} method={} path={} http_status={} duration_ms={} error={}",
            request_id,
            method,
            path,
            status.as_u16(),
            duration_ms,
            detail.as_deref().unwrap_or("unreported client error")
        );
        match (status, detail.is_some()) {
            (StatusCode::NOT_FOUND, false) => with_detail_body(response, ApiError::RouteNotFound),
            (StatusCode::METHOD_NOT_ALLOWED, false) => {
                with_detail_body(response, ApiError::MethodNotAllowed)
            }
            _ => response,
        }
    } else {
        info!(
            "event=http_request module=http status=ok request_id={} method={} path={} http_status={} duration_ms={}",
            request_id,
            method,
            path,
            status.as_u16(),
            duration_ms
        );
        response
    }
}

/// Replaces a framework-generated empty error body, keeping its `Allow` header.
fn with_detail_body(original: Response, error: ApiError) -> Response {
    let allow = original.headers().get(ALLOW).cloned();
    let mut response = error.into_response();
    if let Some(allow) = allow {
        response.headers_mut().insert(ALLOW, allow);
    }
    response
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    ApiError::Internal(format!(
        "handler panicked: {}",
        sanitize_message(&message, MAX_PANIC_DETAIL_CHARS)
    ))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::install;
    use axum::body::{to_bytes, Body};
    use axum::extract::Request as ExtractedRequest;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn body_text(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn panics_become_generic_500() {
        async fn explode() -> &'static str {
            panic!("secret connection string leaked")
        }
        let router = install(Router::new().route("/boom", get(explode)));

        let (status, body) = body_text(router, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"detail":"Internal Server Error"}"#);
    }

    #[tokio::test]
    async fn bare_5xx_responses_are_rewritten() {
        let router = install(Router::new().route(
            "/unavailable",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "pool exhausted at 10.0.0.3") }),
        ));

        let (status, body) = body_text(router, "/unavailable").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"detail":"Internal Server Error"}"#);
    }

    #[tokio::test]
    async fn unmatched_paths_get_detail_body() {
        let router = install(Router::new().route("/ok", get(|| async { "fine" })));

        let (status, body) = body_text(router, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let router = install(Router::new().route("/ok", get(|| async { "fine" })));

        let (status, body) = body_text(router, "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "fine");
    }

    #[tokio::test]
    async fn client_request_id_is_kept_and_echoed() {
        let router = install(Router::new().route(
            "/echo",
            get(|request: ExtractedRequest| async move {
                request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        ));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header("x-request-id", "client-abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "client-abc");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"client-abc");
    }

    #[tokio::test]
    async fn missing_request_id_is_generated() {
        let router = install(Router::new().route("/ok", get(|| async { "fine" })));

        let response = router
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }
}
