//! Account service.
//!
//! Orchestrates account creation, login, password changes, activation and
//! soft deletion, composing the session service and the password hasher.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use dynstory_common::{AppError, AppResult, IdGenerator, MAX_NONCE_ATTEMPTS};
use dynstory_db::{
    entities::{session, user},
    repositories::UserRepository,
};
use rand::RngCore;
use sea_orm::Set;
use validator::ValidateEmail;

use crate::SessionService;

/// Bytes of randomness behind an activation ID.
const ACTIVATION_ID_BYTES: usize = 32;

/// Account service for user lifecycle operations.
#[derive(Clone)]
pub struct AccountService {
    users: UserRepository,
    sessions: SessionService,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(users: UserRepository, sessions: SessionService) -> Self {
        Self {
            users,
            sessions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account.
    ///
    /// Returns the new session and the activation ID. The caller is
    /// responsible for dispatching the activation email.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(session::Model, String)> {
        let username_lower = username.to_lowercase();
        let email = email.to_lowercase();

        // Both existence checks must pass. The unique indexes remain the
        // real collision guard; this only catches the common case early.
        let (username_taken, email_taken) = tokio::try_join!(
            self.users.find_by_username_lower(&username_lower),
            self.users.find_by_email(&email),
        )?;

        if username_taken.is_some() {
            return Err(AppError::Conflict("Username already exists.".to_string()));
        }
        if email_taken.is_some() {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }

        let (password_hash, activation_id) = tokio::try_join!(
            async { hash_password(password) },
            self.generate_activation_id(),
        )?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            username_lower: Set(username_lower),
            email: Set(email),
            password_hash: Set(password_hash),
            activation_id: Set(Some(activation_id.clone())),
            is_deleted: Set(false),
            is_activated: Set(false),
            created_at: Set(Utc::now().into()),
        };

        let user = self.users.create(model).await?;
        let session = self.sessions.create(&user.id).await?;

        Ok((session, activation_id))
    }

    /// Authenticate by username or email plus password.
    ///
    /// Soft-deleted users are excluded. "Not found" and "wrong password"
    /// stay distinct client-class errors. Success always creates a brand-new
    /// session; prior sessions are neither reused nor extended.
    pub async fn authenticate(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> AppResult<(String, session::Model)> {
        let lookup = username_or_email.to_lowercase();

        let candidate = if lookup.validate_email() {
            self.users.find_login_by_email(&lookup).await?
        } else {
            self.users.find_login_by_username_lower(&lookup).await?
        };

        let user =
            candidate.ok_or_else(|| AppError::UserNotFound(username_or_email.to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::WrongPassword);
        }

        let session = self.sessions.create(&user.id).await?;
        Ok((user.username, session))
    }

    /// Change a password: resolve session, load user, verify the old
    /// password, hash the new one, persist. Each step gates the next.
    pub async fn update_password(
        &self,
        token: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let owner_id = self.sessions.resolve(token).await?;

        let user = self
            .users
            .find_by_id(&owner_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Session owner {owner_id} has no user record"))
            })?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(AppError::WrongPassword);
        }

        let password_hash = hash_password(new_password)?;

        let rows = self.users.update_password(&user.id, &password_hash).await?;
        if rows == 0 {
            // The user passed the lookup above, so this is an internal
            // inconsistency or a concurrent deletion, not a client fault.
            return Err(AppError::Internal(format!(
                "User {owner_id} disappeared between password check and update"
            )));
        }

        Ok(())
    }

    /// Consume an activation ID.
    ///
    /// The ID is cleared and the account flagged active in one atomic
    /// update; a second call with the same ID lands in "not found".
    pub async fn activate(&self, activation_id: &str) -> AppResult<()> {
        let rows = self.users.activate(activation_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("Activation ID not found.".to_string()));
        }
        Ok(())
    }

    /// Soft-delete the account a token belongs to, destroying all of its
    /// sessions at the same time.
    pub async fn delete(&self, token: &str) -> AppResult<()> {
        let owner_id = self.sessions.resolve(token).await?;

        let (_, rows) = tokio::try_join!(
            self.sessions.destroy_all(&owner_id),
            self.users.mark_deleted(&owner_id),
        )?;

        if rows == 0 {
            return Err(AppError::UserNotFound(owner_id));
        }
        Ok(())
    }

    /// Generate an activation ID that is not already stored, retrying on
    /// collision up to the shared attempt bound.
    async fn generate_activation_id(&self) -> AppResult<String> {
        for _ in 0..=MAX_NONCE_ATTEMPTS {
            let mut bytes = [0u8; ACTIVATION_ID_BYTES];
            rand::rngs::OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| AppError::Internal(format!("Random byte source failed: {e}")))?;

            // URL-safe without an alphabet switch: the original stripped
            // the base64 specials instead.
            let mut activation_id = STANDARD.encode(bytes);
            activation_id.retain(|c| !matches!(c, '/' | '+' | '='));

            if self
                .users
                .find_by_activation_id(&activation_id)
                .await?
                .is_none()
            {
                return Ok(activation_id);
            }
        }

        Err(AppError::Internal(
            "Activation ID generation exceeded the retry bound.".to_string(),
        ))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dynstory_db::repositories::SessionRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: hash_password(password).unwrap(),
            activation_id: None,
            is_deleted: false,
            is_activated: true,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_session(owner: &str) -> session::Model {
        session::Model {
            id: "sess1".to_string(),
            owner_id: owner.to_string(),
            nonce: vec![1; 256],
            expires_at: (Utc::now() + Duration::days(2)).into(),
        }
    }

    fn service_over(user_db: MockDatabase, session_db: MockDatabase) -> AccountService {
        let users = UserRepository::new(Arc::new(user_db.into_connection()));
        let sessions =
            SessionService::new(SessionRepository::new(Arc::new(session_db.into_connection())));
        AccountService::new(users, sessions)
    }

    // Password helper tests

    #[test]
    fn test_hash_password_produces_argon2() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("secret1").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_salted() {
        let hash1 = hash_password("same").unwrap();
        let hash2 = hash_password("same").unwrap();
        assert_ne!(hash1, hash2);
    }

    // Service tests

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = create_test_user("user1", "Alice", "secret1");

        // Username check hits, email check misses.
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([Vec::<user::Model>::new()]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        // Differs only in case from the stored "Alice".
        let result = service
            .create("ALICE", "other@example.com", "secret1")
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_email() {
        let existing = create_test_user("user1", "alice", "secret1");

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![existing]]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        let result = service
            .create("bob", "alice@example.com", "secret1")
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_returns_session_and_activation_id() {
        let stored = user::Model {
            activation_id: Some("pendingactivation".to_string()),
            is_activated: false,
            ..create_test_user("user1", "alice", "secret1")
        };

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            // username free
            .append_query_results([Vec::<user::Model>::new()])
            // email free
            .append_query_results([Vec::<user::Model>::new()])
            // activation ID free
            .append_query_results([Vec::<user::Model>::new()])
            // insert returning
            .append_query_results([vec![stored]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            // nonce free
            .append_query_results([Vec::<session::Model>::new()])
            // insert returning
            .append_query_results([[create_test_session("user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let service = service_over(user_db, session_db);
        let (session, activation_id) = service
            .create("alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(session.owner_id, "user1");
        assert!(!activation_id.is_empty());
        assert!(
            activation_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric()),
            "activation ID must not carry base64 specials: {activation_id}"
        );
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_is_not_found() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        let result = service.authenticate("nobody", "secret1").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_is_distinct_error() {
        let user = create_test_user("user1", "alice", "secret1");

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        let result = service.authenticate("alice", "wrong").await;

        assert!(matches!(result, Err(AppError::WrongPassword)));
    }

    #[tokio::test]
    async fn test_authenticate_case_insensitive_username() {
        let user = create_test_user("user1", "alice", "secret1");

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<session::Model>::new()])
            .append_query_results([[create_test_session("user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let service = service_over(user_db, session_db);
        let (username, session) = service.authenticate("ALICE", "secret1").await.unwrap();

        assert_eq!(username, "alice");
        assert_eq!(session.owner_id, "user1");
    }

    #[tokio::test]
    async fn test_activate_consumed_id_is_not_found() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        let result = service.activate("already-used").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_activate_fresh_id_succeeds() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(user_db, session_db);
        service.activate("fresh-id").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_password_wrong_old_password_aborts() {
        let user = create_test_user("user1", "alice", "secret1");
        let session = session::Model {
            nonce: vec![2; 256],
            ..create_test_session("user1")
        };
        let token = dynstory_common::encode_token(&session.nonce);

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]]);

        let service = service_over(user_db, session_db);
        let result = service.update_password(&token, "wrong", "newsecret").await;

        assert!(matches!(result, Err(AppError::WrongPassword)));
    }

    #[tokio::test]
    async fn test_update_password_vanished_user_is_server_error() {
        let user = create_test_user("user1", "alice", "secret1");
        let session = session::Model {
            nonce: vec![2; 256],
            ..create_test_session("user1")
        };
        let token = dynstory_common::encode_token(&session.nonce);

        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            // the UPDATE matches nothing: user vanished mid-pipeline
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]]);

        let service = service_over(user_db, session_db);
        let result = service
            .update_password(&token, "secret1", "newsecret")
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_delete_destroys_sessions_and_flags_user() {
        let session = session::Model {
            nonce: vec![3; 256],
            ..create_test_session("user1")
        };
        let token = dynstory_common::encode_token(&session.nonce);

        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }]);

        let service = service_over(user_db, session_db);
        service.delete(&token).await.unwrap();
    }
}
