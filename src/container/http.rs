//! HTTP-backed container namespace.
//!
//! # Responsibilities
//! - Derive container identifiers for the configured binding
//! - Keep one handle per identifier, created on first lookup
//! - Forward requests to the container's service port
//! - Map transport errors to `ForwardError`

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Response, Uri, Version};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ContainerConfig, TimeoutConfig};
use crate::container::{ContainerId, ContainerNamespace, ContainerStub, ForwardError};

/// Namespace whose containers all listen on one configured `host:port`.
pub struct HttpContainerNamespace {
    binding: String,
    authority: Authority,
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    instances: DashMap<ContainerId, Arc<HttpContainer>>,
}

impl HttpContainerNamespace {
    /// Create a namespace from configuration.
    pub fn new(container: &ContainerConfig, timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let address = format!("{}:{}", container.host, container.port);
        let authority = Authority::from_str(&address).map_err(|e| {
            ForwardError::Unavailable(format!("invalid container address {}: {}", address, e))
        })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            binding: container.binding.clone(),
            authority,
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            instances: DashMap::new(),
        })
    }

    /// Number of container handles created so far.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

impl ContainerNamespace for HttpContainerNamespace {
    fn id_from_name(&self, name: &str) -> Result<ContainerId, ForwardError> {
        ContainerId::from_name(&self.binding, name)
    }

    fn get(&self, id: &ContainerId) -> Result<Arc<dyn ContainerStub>, ForwardError> {
        let container = match self.instances.entry(id.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                tracing::info!(
                    container_id = %id,
                    address = %self.authority,
                    "Creating container handle"
                );
                let container = Arc::new(HttpContainer {
                    id: id.clone(),
                    authority: self.authority.clone(),
                    client: self.client.clone(),
                    request_timeout: self.request_timeout,
                });
                entry.insert(container).value().clone()
            }
        };
        Ok(container)
    }
}

/// Handle to one container reachable over plain HTTP.
#[derive(Debug)]
pub struct HttpContainer {
    id: ContainerId,
    authority: Authority,
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl HttpContainer {
    /// Point the request target at the container, keeping path and query.
    fn target_uri(&self, uri: &Uri) -> Result<Uri, ForwardError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).map_err(|e| ForwardError::Upstream(e.to_string()))
    }
}

impl ContainerStub for HttpContainer {
    fn id(&self) -> &ContainerId {
        &self.id
    }

    fn fetch(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, ForwardError>> {
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            parts.uri = self.target_uri(&parts.uri)?;
            // The container side only speaks HTTP/1.1.
            parts.version = Version::HTTP_11;

            tracing::debug!(
                container_id = %self.id,
                method = %parts.method,
                uri = %parts.uri,
                "Forwarding to container"
            );

            let response = tokio::time::timeout(
                self.request_timeout,
                self.client.request(Request::from_parts(parts, body)),
            )
            .await
            .map_err(|_| ForwardError::Timeout(self.request_timeout.as_secs()))?
            .map_err(classify_client_error)?;

            Ok(response.map(Body::new))
        })
    }
}

fn classify_client_error(err: hyper_util::client::legacy::Error) -> ForwardError {
    let message = error_chain(&err);
    let malformed = std::error::Error::source(&err)
        .and_then(|source| source.downcast_ref::<hyper::Error>())
        .is_some_and(|e| e.is_parse() || e.is_incomplete_message());

    if malformed {
        ForwardError::MalformedResponse(message)
    } else {
        ForwardError::Upstream(message)
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
