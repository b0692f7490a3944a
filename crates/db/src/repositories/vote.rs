//! Vote repository.

use std::sync::Arc;

use crate::entities::{Vote, vote};
use dynstory_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    sea_query::Expr,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's active vote on a question.
    pub async fn find_active(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::QuestionId.eq(question_id))
            .filter(vote::Column::IsLatest.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new vote record.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip every active vote by a user on a question to inactive (single
    /// UPDATE, no fetch).
    ///
    /// Normally exactly one row matches; after an interrupted re-vote two
    /// may, and flipping them all is what lets that state heal.
    pub async fn deactivate(&self, user_id: &str, question_id: &str) -> AppResult<u64> {
        let result = Vote::update_many()
            .col_expr(vote::Column::IsLatest, Expr::value(false))
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::QuestionId.eq(question_id))
            .filter(vote::Column::IsLatest.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Answer indexes of every active vote on a question.
    pub async fn active_answers_for_question(&self, question_id: &str) -> AppResult<Vec<i32>> {
        Vote::find()
            .select_only()
            .column(vote::Column::Answer)
            .filter(vote::Column::QuestionId.eq(question_id))
            .filter(vote::Column::IsLatest.eq(true))
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set, Value};
    use std::sync::Arc;

    fn create_test_vote(id: &str, user: &str, question: &str, answer: i32) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            user_id: user.to_string(),
            question_id: question.to_string(),
            answer,
            story_pretty_id: 1,
            is_latest: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_active_found() {
        let vote = create_test_vote("vote1", "user1", "q1", 2);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_active("user1", "q1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().answer, 2);
    }

    #[tokio::test]
    async fn test_find_active_none_for_non_voter() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_active("user1", "q1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_vote() {
        let vote = create_test_vote("vote1", "user1", "q1", 4);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);

        let active = vote::ActiveModel {
            id: Set("vote1".to_string()),
            user_id: Set("user1".to_string()),
            question_id: Set("q1".to_string()),
            answer: Set(4),
            story_pretty_id: Set(1),
            is_latest: Set(true),
            created_at: Set(Utc::now().into()),
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.answer, 4);
        assert!(result.is_latest);
    }

    #[tokio::test]
    async fn test_deactivate_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let rows = repo.deactivate("user1", "q1").await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_active_answers_for_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! { "answer" => Value::Int(Some(0)) },
                    btreemap! { "answer" => Value::Int(Some(4)) },
                    btreemap! { "answer" => Value::Int(Some(4)) },
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let answers = repo.active_answers_for_question("q1").await.unwrap();
        assert_eq!(answers, vec![0, 4, 4]);
    }
}
