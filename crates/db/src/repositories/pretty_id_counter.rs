//! Pretty-ID counter repository.

use std::sync::Arc;

use crate::entities::pretty_id_counter;
use dynstory_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, Statement};

/// Repository for the single-row pretty-ID counter.
#[derive(Clone)]
pub struct CounterRepository {
    db: Arc<DatabaseConnection>,
}

impl CounterRepository {
    /// Create a new counter repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Atomically increment the counter and return the pre-increment value.
    ///
    /// One UPDATE statement; `RETURNING value - 1` recovers the value as it
    /// stood before the increment, which is the value being allocated.
    /// Returns `None` when the counter row does not exist yet (the
    /// first-ever allocation).
    pub async fn increment_and_get(&self) -> AppResult<Option<i64>> {
        let stmt = Statement::from_string(
            self.db.get_database_backend(),
            "UPDATE pretty_id_counter SET value = value + 1 RETURNING value - 1 AS value"
                .to_string(),
        );

        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let value: i64 = row
                    .try_get("", "value")
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Seed the counter row so that the *second* allocation reads 2.
    ///
    /// Only the allocator's serialized first-use branch may call this; the
    /// single-row invariant depends on it never racing with itself.
    pub async fn create_seeded(&self) -> AppResult<pretty_id_counter::Model> {
        let model = pretty_id_counter::ActiveModel {
            value: Set(2),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
