//! Feedback endpoint.

use axum::{Json, Router, extract::State, routing::post};
use dynstory_common::AppResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::SessionToken, middleware::AppState, response::ApiResponse};

/// Feedback submission request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[validate(length(min = 5))]
    pub feedback: String,
}

/// Acknowledgement response.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Submit feedback; it is emailed to the team with an audit copy stored.
async fn submit_feedback(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    req.validate()?;

    state.feedback_service.submit(&token, &req.feedback).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_feedback))
}
