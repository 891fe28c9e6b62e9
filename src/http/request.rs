//! Request identification.
//!
//! # Responsibilities
//! - Give every request an ID for log correlation
//! - Record the ID on the request's tracing span
//!
//! # Design Decisions
//! - The ID lives only in the span; the request and response are not touched
//! - An `x-request-id` sent by the client is reused as-is

use axum::http::{HeaderName, Request};
use tower_http::trace::MakeSpan;
use tracing::Span;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The client's `x-request-id`, or a fresh UUID v4 when it sent none.
pub fn request_id_for<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Opens one span per request carrying its ID, method and URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            request_id = %request_id_for(request),
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}
