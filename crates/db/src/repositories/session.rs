//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use chrono::{DateTime, Utc};
use dynstory_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by its nonce.
    ///
    /// Expiry is not checked here; the session service applies the
    /// read-time validity rule.
    pub async fn find_by_nonce(&self, nonce: &[u8]) -> AppResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::Nonce.eq(nonce))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session by ID.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Session::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete every session owned by a user. Idempotent: zero sessions is
    /// success.
    pub async fn delete_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::OwnerId.eq(owner_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete every session whose expiry has passed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
