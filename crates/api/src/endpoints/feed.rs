//! Feed endpoint: pages of the most recent stories.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use dynstory_common::{AppError, AppResult};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// One feed entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStoryResponse {
    /// The story's pretty ID.
    pub story: i64,
    pub author: String,
    pub title: String,
    pub narrative: String,
    pub question: String,
    pub creation_date: String,
}

/// Feed response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub feed: Vec<FeedStoryResponse>,
    pub last_page: u64,
}

/// Fetch one page of recent stories.
async fn get_feed(
    State(state): State<AppState>,
    Path(page): Path<u64>,
) -> AppResult<ApiResponse<FeedResponse>> {
    if page < 1 {
        return Err(AppError::BadRequest(
            "Page must be a positive number.".to_string(),
        ));
    }

    let (feed, last_page) = state.story_service.recent(page).await?;

    Ok(ApiResponse::ok(FeedResponse {
        feed: feed
            .into_iter()
            .map(|entry| FeedStoryResponse {
                story: entry.story,
                author: entry.author,
                title: entry.title,
                narrative: entry.narrative,
                question: entry.question,
                creation_date: entry.created_at.to_rfc3339(),
            })
            .collect(),
        last_page,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{page}", get(get_feed))
}
