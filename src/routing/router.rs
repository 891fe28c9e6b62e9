//! Edge router: health check or forward to the container.
//!
//! # Responsibilities
//! - Answer the health path locally
//! - Resolve the fixed container instance and forward everything else
//! - Annotate container responses with diagnostic headers
//! - Collapse every forwarding failure into one 500 envelope
//!
//! # Design Decisions
//! - No state between calls; the handle is re-resolved per request
//! - Namespace injected as a trait object

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::Arc;

use crate::container::{ContainerNamespace, ForwardError};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::matcher::{match_request, Route};

pub struct EdgeRouter {
    namespace: Arc<dyn ContainerNamespace>,
    instance_name: String,
}

impl EdgeRouter {
    pub fn new(namespace: Arc<dyn ContainerNamespace>, instance_name: impl Into<String>) -> Self {
        Self {
            namespace,
            instance_name: instance_name.into(),
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Handle one inbound request. Never fails; errors become a 500 response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match match_request(&request) {
            Route::Health => response::health(),
            Route::Container => match self.forward(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        instance = %self.instance_name,
                        error = %e,
                        "Error forwarding to container"
                    );
                    metrics::record_forward_failure();
                    response::forwarding_failure(&e)
                }
            },
        }
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let id = self.namespace.id_from_name(&self.instance_name)?;
        let container = self.namespace.get(&id)?;
        let response = container.fetch(request).await?;
        response::annotate(response, &id)
    }
}
