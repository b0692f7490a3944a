//! User endpoints: account creation, login, session management, password
//! change, activation and deletion.

use axum::{
    Json, Router,
    extract::State,
    routing::{post, put},
};
use chrono::Utc;
use dynstory_common::{AppResult, encode_token};
use dynstory_db::entities::session;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::SessionToken, middleware::AppState, response::ApiResponse};

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 5, max = 512))]
    pub password: String,
}

/// Signup response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub token: String,
    /// Milliseconds until the session expires.
    pub ttl: i64,
}

/// Create a new account.
///
/// The activation email is dispatched in the background; a mail failure is
/// logged but never fails the signup.
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<CreateUserResponse>> {
    req.validate()?;

    let (session, activation_id) = state
        .account_service
        .create(&req.username, &req.email, &req.password)
        .await?;

    let email_service = state.email_service.clone();
    let username = req.username.clone();
    let to = req.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_activation(&username, &to, &activation_id)
            .await
        {
            tracing::warn!(error = %e, "Could not send signup email");
        }
    });

    Ok(ApiResponse::ok(CreateUserResponse {
        token: encode_token(&session.nonce),
        ttl: ttl_ms(&session),
    }))
}

/// Login request. The single identity field accepts a username or an email.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    #[validate(length(min = 1, max = 254))]
    pub username_email: String,

    #[validate(length(min = 5, max = 512))]
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    pub username: String,
    pub token: String,
    pub ttl: i64,
}

/// Log in with username or email.
async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<AuthenticateRequest>,
) -> AppResult<ApiResponse<AuthenticateResponse>> {
    req.validate()?;

    let (username, session) = state
        .account_service
        .authenticate(&req.username_email, &req.password)
        .await?;

    Ok(ApiResponse::ok(AuthenticateResponse {
        username,
        token: encode_token(&session.nonce),
        ttl: ttl_ms(&session),
    }))
}

/// Session rotation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReauthenticateResponse {
    pub token: String,
    pub ttl: i64,
}

/// Swap the current session for a fresh one.
async fn reauthenticate(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ReauthenticateResponse>> {
    let session = state.session_service.reauthenticate(&token).await?;

    Ok(ApiResponse::ok(ReauthenticateResponse {
        token: encode_token(&session.nonce),
        ttl: ttl_ms(&session),
    }))
}

/// Plain acknowledgement response.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Log out: destroy the current session.
async fn logout(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.session_service.destroy(&token).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Password change request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 5, max = 512))]
    pub old_password: String,

    #[validate(length(min = 5, max = 512))]
    pub new_password: String,
}

/// Change the caller's password.
async fn update_password(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    req.validate()?;

    state
        .account_service
        .update_password(&token, &req.old_password, &req.new_password)
        .await?;

    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Activation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[validate(length(min = 1, max = 64))]
    pub activation_id: String,
}

/// Consume an activation ID.
async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> AppResult<ApiResponse<OkResponse>> {
    req.validate()?;

    state.account_service.activate(&req.activation_id).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Soft-delete the caller's account.
async fn delete_user(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.account_service.delete(&token).await?;
    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Milliseconds of validity left on a session, as shown to clients.
fn ttl_ms(session: &session::Model) -> i64 {
    session
        .expires_at
        .signed_duration_since(Utc::now())
        .num_milliseconds()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).delete(delete_user))
        .route("/authenticate", post(authenticate))
        .route("/reauthenticate", post(reauthenticate))
        .route("/logout", post(logout))
        .route("/password", put(update_password))
        .route("/activate", post(activate))
}
