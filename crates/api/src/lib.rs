//! HTTP API layer for dynstory.
//!
//! This crate provides the REST surface:
//!
//! - **Endpoints**: user, story, question, feed and feedback routers
//! - **Extractors**: the `token` bearer header
//! - **State**: the service bundle handlers run against
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
