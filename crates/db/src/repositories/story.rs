//! Story repository.

use std::sync::Arc;

use crate::entities::{Story, story};
use dynstory_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Story repository for database operations.
#[derive(Clone)]
pub struct StoryRepository {
    db: Arc<DatabaseConnection>,
}

impl StoryRepository {
    /// Create a new story repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a story by its pretty ID.
    pub async fn find_by_pretty_id(&self, pretty_id: i64) -> AppResult<Option<story::Model>> {
        Story::find()
            .filter(story::Column::PrettyId.eq(pretty_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a story by its pretty ID, returning an error if not found.
    pub async fn get_by_pretty_id(&self, pretty_id: i64) -> AppResult<story::Model> {
        self.find_by_pretty_id(pretty_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Story doesn't exist.".to_string()))
    }

    /// Create a new story.
    pub async fn create(&self, model: story::ActiveModel) -> AppResult<story::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a story by ID.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Story::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Count all stories.
    pub async fn count(&self) -> AppResult<u64> {
        Story::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recently created stories, paginated.
    pub async fn find_recent(&self, offset: u64, limit: u64) -> AppResult<Vec<story::Model>> {
        Story::find()
            .order_by_desc(story::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_story(id: &str, pretty_id: i64, author: &str) -> story::Model {
        story::Model {
            id: id.to_string(),
            pretty_id,
            author_id: author.to_string(),
            title: "A story of sufficient length".to_string(),
            narrative: "Once upon a time, in a test fixture far away.".to_string(),
            question_id: "q1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_pretty_id_found() {
        let story = create_test_story("story1", 7, "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[story.clone()]])
                .into_connection(),
        );

        let repo = StoryRepository::new(db);
        let result = repo.find_by_pretty_id(7).await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().pretty_id, 7);
    }

    #[tokio::test]
    async fn test_get_by_pretty_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<story::Model>::new()])
                .into_connection(),
        );

        let repo = StoryRepository::new(db);
        let result = repo.get_by_pretty_id(404).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_story() {
        let story = create_test_story("story1", 1, "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[story.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = StoryRepository::new(db);

        let active = story::ActiveModel {
            id: Set("story1".to_string()),
            pretty_id: Set(1),
            author_id: Set("user1".to_string()),
            title: Set(story.title.clone()),
            narrative: Set(story.narrative.clone()),
            question_id: Set("q1".to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.pretty_id, 1);
    }

    #[tokio::test]
    async fn test_find_recent() {
        let story1 = create_test_story("story1", 2, "user1");
        let story2 = create_test_story("story2", 1, "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[story1, story2]])
                .into_connection(),
        );

        let repo = StoryRepository::new(db);
        let result = repo.find_recent(0, 40).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
