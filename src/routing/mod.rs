//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (health path or container)
//!     → router.rs
//!         Health    → static JSON status
//!         Container → resolve id → get handle → fetch → annotate
//! ```
//!
//! # Design Decisions
//! - Deterministic: same input always matches same route
//! - One fixed container instance; no load balancing

pub mod matcher;
pub mod router;

pub use matcher::{match_request, Route, HEALTH_PATH};
pub use router::EdgeRouter;
