//! Bento edge worker library.
//!
//! Answers `/health` locally and forwards every other request to a single
//! named container, tagging the response with where it was processed.

pub mod config;
pub mod container;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::WorkerConfig;
pub use container::{ContainerId, ContainerNamespace, ContainerStub, ForwardError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::EdgeRouter;
