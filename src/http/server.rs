//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every method and path to the edge router
//! - Wire up tracing middleware with a per-request ID span
//! - Bind server to listener
//! - Swap in a rebuilt edge router when configuration changes
//! - Record request metrics

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;

use crate::config::validation::validate_config;
use crate::config::{ListenerConfig, WorkerConfig};
use crate::container::{ContainerNamespace, ForwardError, HttpContainerNamespace};
use crate::http::request::RequestSpan;
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics;
use crate::routing::{match_request, EdgeRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<EdgeRouter>>,
}

/// HTTP server hosting the edge router.
pub struct HttpServer {
    router: Router,
    config: WorkerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server forwarding to the container described by `config`.
    pub fn new(config: WorkerConfig) -> Result<Self, ForwardError> {
        let edge = build_edge_router(&config)?;
        Ok(Self::from_edge_router(config, edge))
    }

    /// Create a server forwarding through a caller-supplied namespace.
    pub fn with_namespace(config: WorkerConfig, namespace: Arc<dyn ContainerNamespace>) -> Self {
        let edge = EdgeRouter::new(namespace, config.container.instance_name.clone());
        Self::from_edge_router(config, edge)
    }

    fn from_edge_router(config: WorkerConfig, edge: EdgeRouter) -> Self {
        let state = AppState {
            router: Arc::new(ArcSwap::from_pointee(edge)),
        };
        let router = Self::build_router(state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(worker_handler))
            .route("/", any(worker_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
    }

    /// The fully layered router, for in-process use.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<WorkerConfig>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            instance = %self.config.container.instance_name,
            container_port = self.config.container.port,
            "HTTP server starting"
        );

        let state = self.state.clone();
        let listener_config = self.config.listener.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_reload(&state, &listener_config, new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                wait_for_shutdown(shutdown).await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

/// Swap in a router built from `new_config`, or keep the current one if it is invalid.
fn apply_reload(state: &AppState, listener_config: &ListenerConfig, new_config: WorkerConfig) {
    if let Err(errors) = validate_config(&new_config) {
        for error in &errors {
            tracing::error!(field = %error.field, reason = %error.reason, "Invalid reloaded configuration");
        }
        tracing::error!("Rejected reloaded configuration, keeping current configuration");
        return;
    }
    if new_config.listener != *listener_config {
        tracing::warn!("Listener changes require a restart and were not applied");
    }

    match build_edge_router(&new_config) {
        Ok(edge) => {
            state.router.store(Arc::new(edge));
            tracing::info!(
                instance = %new_config.container.instance_name,
                host = %new_config.container.host,
                port = new_config.container.port,
                "Configuration reloaded"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected reloaded configuration");
        }
    }
}

fn build_edge_router(config: &WorkerConfig) -> Result<EdgeRouter, ForwardError> {
    let namespace = HttpContainerNamespace::new(&config.container, &config.timeouts)?;
    Ok(EdgeRouter::new(
        Arc::new(namespace),
        config.container.instance_name.clone(),
    ))
}

/// Entry point for every request.
async fn worker_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let route = match_request(&request);

    tracing::debug!(
        method = %method,
        path = %request.uri().path(),
        route = route.as_str(),
        "Handling request"
    );

    let router = state.router.load_full();
    let response = router.handle(request).await;

    metrics::record_request(&method, route.as_str(), response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerId, ContainerStub};
    use crate::http::X_REQUEST_ID;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    struct DownNamespace;

    impl ContainerNamespace for DownNamespace {
        fn id_from_name(&self, name: &str) -> Result<ContainerId, ForwardError> {
            ContainerId::from_name("BENTO", name)
        }

        fn get(&self, _id: &ContainerId) -> Result<Arc<dyn ContainerStub>, ForwardError> {
            Err(ForwardError::Unavailable("not provisioned".into()))
        }
    }

    #[tokio::test]
    async fn health_through_full_stack_adds_no_request_id() {
        let server = HttpServer::new(WorkerConfig::default()).unwrap();

        let response = server
            .app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(X_REQUEST_ID).is_none());
    }

    #[tokio::test]
    async fn injected_namespace_failure_surfaces_as_500() {
        let server = HttpServer::with_namespace(WorkerConfig::default(), Arc::new(DownNamespace));

        let response = server
            .app()
            .oneshot(Request::builder().uri("/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(X_REQUEST_ID).is_none());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "container unavailable: not provisioned");
    }

    #[tokio::test]
    async fn valid_reload_swaps_instance_name() {
        let server = HttpServer::new(WorkerConfig::default()).unwrap();
        assert_eq!(server.state.router.load().instance_name(), "bento-processor-1");

        let mut config = WorkerConfig::default();
        config.container.instance_name = "bento-processor-2".into();
        apply_reload(&server.state, &server.config.listener, config);

        assert_eq!(server.state.router.load().instance_name(), "bento-processor-2");
    }

    #[tokio::test]
    async fn invalid_reload_keeps_current_router() {
        let server = HttpServer::new(WorkerConfig::default()).unwrap();

        let mut config = WorkerConfig::default();
        config.container.instance_name = "bento-processor-2".into();
        config.container.port = 0;
        apply_reload(&server.state, &server.config.listener, config);

        assert_eq!(server.state.router.load().instance_name(), "bento-processor-1");
    }
}
