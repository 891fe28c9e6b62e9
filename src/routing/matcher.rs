//! Route matching logic.
//!
//! # Design Decisions
//! - Health path is an exact, case-sensitive path match
//! - Query string and method are ignored
//! - Everything that is not the health path goes to the container

use axum::http::Request;

/// Path answered locally without contacting the container.
pub const HEALTH_PATH: &str = "/health";

/// Where a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    Container,
}

impl Route {
    /// Label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::Container => "container",
        }
    }
}

/// Classify a request by its path.
pub fn match_request<B>(req: &Request<B>) -> Route {
    if req.uri().path() == HEALTH_PATH {
        Route::Health
    } else {
        Route::Container
    }
}
