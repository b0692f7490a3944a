//! Story endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use dynstory_common::AppResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::SessionToken, middleware::AppState, response::ApiResponse};

/// Story creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    #[validate(length(min = 10, max = 140))]
    pub title: String,

    #[validate(length(min = 20, max = 100_000))]
    pub narrative: String,

    /// ID of the question attached to this story.
    #[validate(length(min = 1, max = 32))]
    pub question: String,
}

/// Story creation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryResponse {
    /// The allocated pretty ID.
    pub story: i64,
}

/// Publish a story.
async fn create_story(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(req): Json<CreateStoryRequest>,
) -> AppResult<ApiResponse<CreateStoryResponse>> {
    req.validate()?;

    let pretty_id = state
        .story_service
        .create(&token, &req.title, &req.narrative, &req.question)
        .await?;

    Ok(ApiResponse::ok(CreateStoryResponse { story: pretty_id }))
}

/// Story fetch response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub title: String,
    pub narrative: String,
    /// Author username; `null` if the author record is gone.
    pub author: Option<String>,
    pub question: String,
    pub creation_date: String,
}

/// Fetch a story by pretty ID.
async fn get_story(
    State(state): State<AppState>,
    Path(pretty_id): Path<i64>,
) -> AppResult<ApiResponse<StoryResponse>> {
    let result = state.story_service.get(pretty_id).await?;

    Ok(ApiResponse::ok(StoryResponse {
        title: result.story.title,
        narrative: result.story.narrative,
        author: result.author,
        question: result.story.question_id,
        creation_date: result.story.created_at.to_rfc3339(),
    }))
}

/// Acknowledgement response.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Delete one's own story.
async fn delete_story(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(pretty_id): Path<i64>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.story_service.delete(&token, pretty_id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_story))
        .route("/{story}", get(get_story).delete(delete_story))
}
