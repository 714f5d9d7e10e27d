//! services/api/src/web/middleware.rs
//!
//! Request logging middleware.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Wraps each request in a span keyed by its request id and logs the outcome.
///
/// A valid UUID in the incoming `x-request-id` header is reused; otherwise a
/// fresh one is generated. The id is echoed back on the response.
pub async fn log_requests(mut req: Request, next: Next) -> Response {
    let started = Instant::now();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let header_value = HeaderValue::from_str(&request_id.to_string()).ok();

    if let Some(value) = &header_value {
        req.headers_mut().insert(X_REQUEST_ID, value.clone());
    }

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let mut response = next.run(req).await;
        if let Some(value) = header_value {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        info!(
            status = response.status().as_u16(),
            elapsed = ?started.elapsed(),
            "Request completed."
        );
        response
    }
    .instrument(span)
    .await
}
