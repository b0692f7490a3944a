//! API endpoints.

mod feed;
mod feedback;
mod questions;
mod stories;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router. The server nests this under its version prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/user", users::router())
        .nest("/story", stories::router())
        .nest("/question", questions::router())
        .nest("/feed", feed::router())
        .nest("/feedback", feedback::router())
}
