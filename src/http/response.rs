//! Response construction and annotation.
//!
//! # Responsibilities
//! - Build the health-check payload
//! - Build the forwarding-failure envelope
//! - Add diagnostic headers to container responses
//!
//! # Design Decisions
//! - Container bodies are streamed through, never buffered
//! - Only the two diagnostic headers are touched; everything else the
//!   container set is preserved

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::container::{ContainerId, ForwardError};

/// Marks responses that passed through this worker.
pub const X_PROCESSED_BY: HeaderName = HeaderName::from_static("x-processed-by");

/// Carries the identifier of the container that served the request.
pub const X_CONTAINER_ID: HeaderName = HeaderName::from_static("x-container-id");

pub const PROCESSED_BY_VALUE: &str = "Cloudflare-Bento-Worker";

pub const SERVICE_NAME: &str = "bento-worker";

pub const FAILURE_MESSAGE: &str = "Failed to process request";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: &'static str,
    pub message: String,
    pub timestamp: String,
}

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 200 response for the health endpoint.
pub fn health() -> Response {
    let body = HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
        timestamp: timestamp(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// 500 response reporting a failed forward.
pub fn forwarding_failure(err: &ForwardError) -> Response {
    let body = ErrorEnvelope {
        error: FAILURE_MESSAGE,
        message: err.to_string(),
        timestamp: timestamp(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Add the diagnostic headers to a container response.
pub fn annotate(mut response: Response, id: &ContainerId) -> Result<Response, ForwardError> {
    let container_id =
        HeaderValue::from_str(id.as_str()).map_err(|e| ForwardError::InvalidHeader(e.to_string()))?;

    let headers = response.headers_mut();
    headers.insert(X_PROCESSED_BY, HeaderValue::from_static(PROCESSED_BY_VALUE));
    headers.insert(X_CONTAINER_ID, container_id);
    Ok(response)
}
