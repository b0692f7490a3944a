//! Session service.
//!
//! Owns the authentication-session lifecycle: nonce generation with bounded
//! collision retry, creation, token resolution, destruction, and the expiry
//! rule. Expired and nonexistent sessions are deliberately indistinguishable
//! to callers.

use chrono::{Duration, Utc};
use dynstory_common::{
    AppError, AppResult, IdGenerator, MAX_NONCE_ATTEMPTS, decode_token,
};
use dynstory_db::{entities::session, repositories::SessionRepository};
use rand::{RngCore, rngs::OsRng};
use sea_orm::Set;

/// Length in bytes of a session nonce.
const NONCE_LEN: usize = 256;

/// How long a session stays valid, in days.
const SESSION_TTL_DAYS: i64 = 2;

/// Session service for authentication state.
#[derive(Clone)]
pub struct SessionService {
    sessions: SessionRepository,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(sessions: SessionRepository) -> Self {
        Self {
            sessions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a session for a user.
    ///
    /// Returns the stored session so callers can derive the token and a
    /// client-visible TTL from it.
    pub async fn create(&self, user_id: &str) -> AppResult<session::Model> {
        let nonce = self.generate_nonce().await?;

        let model = session::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(user_id.to_string()),
            nonce: Set(nonce),
            expires_at: Set((Utc::now() + Duration::days(SESSION_TTL_DAYS)).into()),
        };

        self.sessions.create(model).await
    }

    /// Resolve a bearer token to the owning user ID.
    ///
    /// A malformed token, an unknown nonce and an expired session all report
    /// the same client-class error. Resolution never extends the expiry.
    pub async fn resolve(&self, token: &str) -> AppResult<String> {
        let nonce = decode_token(token).ok_or(AppError::SessionNotFound)?;

        let session = self
            .sessions
            .find_by_nonce(&nonce)
            .await?
            .filter(|s| s.expires_at > Utc::now())
            .ok_or(AppError::SessionNotFound)?;

        Ok(session.owner_id)
    }

    /// Destroy the session a token refers to, returning its stored data so
    /// callers (re-authentication) can reuse the owner.
    pub async fn destroy(&self, token: &str) -> AppResult<session::Model> {
        let nonce = decode_token(token).ok_or(AppError::SessionNotFound)?;

        let session = self
            .sessions
            .find_by_nonce(&nonce)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        self.sessions.delete(&session.id).await?;
        Ok(session)
    }

    /// Destroy every session a user owns. Idempotent.
    pub async fn destroy_all(&self, user_id: &str) -> AppResult<u64> {
        self.sessions.delete_by_owner(user_id).await
    }

    /// Rotate a session: destroy the one the token refers to, then create a
    /// fresh one for the same owner.
    ///
    /// The two steps are sequential, not atomic. A crash in between leaves
    /// the user logged out, which is acceptable: login is always retryable.
    pub async fn reauthenticate(&self, token: &str) -> AppResult<session::Model> {
        let old = self.destroy(token).await?;
        self.create(&old.owner_id).await
    }

    /// Delete every expired session. The server runs this periodically as a
    /// background reaper; correctness never depends on it, since
    /// [`Self::resolve`] checks expiry at read time.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        self.sessions.delete_expired(Utc::now()).await
    }

    /// Generate a nonce that is not already stored, retrying on collision up
    /// to the shared attempt bound. Exhausting the bound signals a systemic
    /// randomness or storage failure, not a user-facing condition.
    async fn generate_nonce(&self) -> AppResult<Vec<u8>> {
        for _ in 0..=MAX_NONCE_ATTEMPTS {
            let mut nonce = vec![0u8; NONCE_LEN];
            OsRng
                .try_fill_bytes(&mut nonce)
                .map_err(|e| AppError::Internal(format!("Random byte source failed: {e}")))?;

            if self.sessions.find_by_nonce(&nonce).await?.is_none() {
                return Ok(nonce);
            }
        }

        Err(AppError::Internal(
            "Nonce generation exceeded the retry bound.".to_string(),
        ))
    }
}
