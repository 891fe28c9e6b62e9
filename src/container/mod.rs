//! Container management subsystem.
//!
//! # Data Flow
//! ```text
//! Edge router
//!     → ContainerNamespace::id_from_name (types.rs, deterministic id)
//!     → ContainerNamespace::get (lookup-or-create handle)
//!     → ContainerStub::fetch (http.rs, forward over HTTP/1.1)
//!     → Response back to the router
//! ```
//!
//! # Design Decisions
//! - The namespace is injected as a trait object so tests can swap in spies
//! - Handles are created on first lookup and reused afterwards
//! - All failures surface as `ForwardError`

pub mod http;
pub mod types;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use std::sync::Arc;

pub use http::{HttpContainer, HttpContainerNamespace};
pub use types::{ContainerId, ForwardError};

/// Maps logical names to identifiers and identifiers to live containers.
pub trait ContainerNamespace: Send + Sync {
    /// Resolve the identifier for a logical instance name.
    fn id_from_name(&self, name: &str) -> Result<ContainerId, ForwardError>;

    /// Obtain a handle to the container, creating it if it does not exist yet.
    fn get(&self, id: &ContainerId) -> Result<Arc<dyn ContainerStub>, ForwardError>;
}

/// Handle to a single running container.
pub trait ContainerStub: Send + Sync {
    fn id(&self) -> &ContainerId;

    /// Send a request to the container's service port.
    fn fetch(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, ForwardError>>;
}
