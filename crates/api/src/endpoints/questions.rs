//! Question endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use dynstory_common::AppResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{MaybeSessionToken, SessionToken},
    middleware::AppState,
    response::ApiResponse,
};

/// Question creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 5, max = 140))]
    pub title: String,

    /// The five answer choices; count and content are checked by the
    /// service.
    pub answers: Vec<String>,
}

/// Question creation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionResponse {
    pub question: String,
}

/// Create a question.
async fn create_question(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> AppResult<ApiResponse<CreateQuestionResponse>> {
    req.validate()?;

    let author_id = state.session_service.resolve(&token).await?;
    let question_id = state
        .question_service
        .create(&req.title, &req.answers, &author_id)
        .await?;

    Ok(ApiResponse::ok(CreateQuestionResponse {
        question: question_id,
    }))
}

/// One answer with its count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub name: String,
    pub votes: u64,
}

/// Question fetch response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub title: String,
    pub answers: Vec<AnswerResponse>,
    /// The caller's active answer index, when logged in and voted.
    pub user_vote: Option<i32>,
}

/// Fetch a question with its vote counts. Login is optional; a valid token
/// additionally returns the caller's own vote.
async fn get_question(
    MaybeSessionToken(token): MaybeSessionToken,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<QuestionResponse>> {
    let result = state
        .question_service
        .get(&question_id, token.as_deref())
        .await?;

    Ok(ApiResponse::ok(QuestionResponse {
        title: result.title,
        answers: result
            .answers
            .into_iter()
            .map(|a| AnswerResponse {
                name: a.name,
                votes: a.votes,
            })
            .collect(),
        user_vote: result.user_vote,
    }))
}

/// Vote request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// Pretty ID of the story the question is being voted on from.
    #[validate(range(min = 1))]
    pub story: i64,

    #[validate(range(min = 0, max = 4))]
    pub answer: i32,
}

/// Acknowledgement response.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Cast or change a vote.
async fn vote(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    req.validate()?;

    state
        .question_service
        .vote(&token, &question_id, req.answer, req.story)
        .await?;

    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_question))
        .route("/{question}", get(get_question))
        .route("/{question}/vote", post(vote))
}
