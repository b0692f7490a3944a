//! Story service.
//!
//! Stories are published under small sequential "pretty IDs" handed out by
//! the allocator process; everything public-facing (fetch, delete, feed)
//! addresses stories by that number, never by the storage key.

use chrono::Utc;
use dynstory_common::{AppError, AppResult, IdGenerator};
use dynstory_db::{
    entities::{story, user},
    repositories::{StoryRepository, UserRepository},
};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::{PrettyIdClient, SessionService};

/// Stories per feed page.
const FEED_PAGE_LEN: u64 = 40;

/// Story service for creation, lookup, deletion and the recent-stories feed.
#[derive(Clone)]
pub struct StoryService {
    stories: StoryRepository,
    users: UserRepository,
    sessions: SessionService,
    pretty_ids: PrettyIdClient,
    id_gen: IdGenerator,
}

/// A story joined with its author's username.
pub struct StoryWithAuthor {
    /// The story record.
    pub story: story::Model,
    /// Author username; absent if the author record is gone.
    pub author: Option<String>,
}

/// One feed entry.
pub struct FeedStory {
    /// The story's pretty ID.
    pub story: i64,
    /// Author username.
    pub author: String,
    /// Story title.
    pub title: String,
    /// Story narrative.
    pub narrative: String,
    /// The attached question's ID.
    pub question: String,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

impl StoryService {
    /// Create a new story service.
    #[must_use]
    pub const fn new(
        stories: StoryRepository,
        users: UserRepository,
        sessions: SessionService,
        pretty_ids: PrettyIdClient,
    ) -> Self {
        Self {
            stories,
            users,
            sessions,
            pretty_ids,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a story, returning its freshly allocated pretty ID.
    pub async fn create(
        &self,
        token: &str,
        title: &str,
        narrative: &str,
        question_id: &str,
    ) -> AppResult<i64> {
        let author_id = self.sessions.resolve(token).await?;
        let pretty_id = self.pretty_ids.next().await?;

        let model = story::ActiveModel {
            id: Set(self.id_gen.generate()),
            pretty_id: Set(pretty_id),
            author_id: Set(author_id),
            title: Set(title.to_string()),
            narrative: Set(narrative.to_string()),
            question_id: Set(question_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.stories.create(model).await?;
        Ok(pretty_id)
    }

    /// Fetch a story by pretty ID, joined with its author's username.
    pub async fn get(&self, pretty_id: i64) -> AppResult<StoryWithAuthor> {
        let story = self.stories.get_by_pretty_id(pretty_id).await?;
        let author = self
            .users
            .find_by_id(&story.author_id)
            .await?
            .map(|u| u.username);

        Ok(StoryWithAuthor { story, author })
    }

    /// Succeeds iff a story with this pretty ID exists.
    pub async fn exists(&self, pretty_id: i64) -> AppResult<()> {
        self.stories
            .find_by_pretty_id(pretty_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Story doesn't exist.".to_string()))
    }

    /// Delete a story. Only the owner may.
    pub async fn delete(&self, token: &str, pretty_id: i64) -> AppResult<()> {
        let user_id = self.sessions.resolve(token).await?;
        let story = self.stories.get_by_pretty_id(pretty_id).await?;

        if story.author_id != user_id {
            return Err(AppError::BadRequest(
                "You are not the story owner.".to_string(),
            ));
        }

        self.stories.delete(&story.id).await?;
        Ok(())
    }

    /// One page of the most recently created stories, plus the number of
    /// the last page.
    pub async fn recent(&self, page: u64) -> AppResult<(Vec<FeedStory>, u64)> {
        let offset = FEED_PAGE_LEN * page.saturating_sub(1);

        let (count, stories) = tokio::try_join!(
            self.stories.count(),
            self.stories.find_recent(offset, FEED_PAGE_LEN),
        )?;

        let author_ids: Vec<String> = stories.iter().map(|s| s.author_id.clone()).collect();
        let authors = self.users.find_by_ids(&author_ids).await?;

        let feed = join_authors(stories, &authors)?;
        let last_page = count.div_ceil(FEED_PAGE_LEN);

        Ok((feed, last_page))
    }
}

/// Attach author usernames to a page of stories, preserving duplicates.
///
/// A story whose author record is missing is an internal inconsistency, not
/// a client condition.
fn join_authors(stories: Vec<story::Model>, authors: &[user::Model]) -> AppResult<Vec<FeedStory>> {
    stories
        .into_iter()
        .map(|story| {
            let author = authors
                .iter()
                .find(|u| u.id == story.author_id)
                .map(|u| u.username.clone())
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Story {} has no author record",
                        story.pretty_id
                    ))
                })?;

            Ok(FeedStory {
                story: story.pretty_id,
                author,
                title: story.title,
                narrative: story.narrative,
                question: story.question_id,
                created_at: story.created_at,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dynstory_common::config::AllocatorConfig;
    use dynstory_common::encode_token;
    use dynstory_db::entities::session;
    use dynstory_db::repositories::SessionRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
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

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{}@example.com", username.to_lowercase()),
            password_hash: "$argon2id$stub".to_string(),
            activation_id: None,
            is_deleted: false,
            is_activated: true,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_session(owner: &str, nonce: Vec<u8>) -> session::Model {
        session::Model {
            id: "sess1".to_string(),
            owner_id: owner.to_string(),
            nonce,
            expires_at: (Utc::now() + Duration::days(2)).into(),
        }
    }

    fn service_over(
        story_db: MockDatabase,
        user_db: MockDatabase,
        session_db: MockDatabase,
    ) -> StoryService {
        StoryService::new(
            StoryRepository::new(Arc::new(story_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            SessionService::new(SessionRepository::new(Arc::new(session_db.into_connection()))),
            PrettyIdClient::new(&AllocatorConfig {
                host: "localhost".to_string(),
                port: 3001,
                path: "/nextPrettyId".to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_get_joins_author_username() {
        let story_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_story("story1", 7, "user1")]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user1", "alice")]]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(story_db, user_db, session_db);
        let result = service.get(7).await.unwrap();

        assert_eq!(result.story.pretty_id, 7);
        assert_eq!(result.author.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_get_tolerates_missing_author() {
        let story_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_story("story1", 7, "ghost")]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(story_db, user_db, session_db);
        let result = service.get(7).await.unwrap();

        assert!(result.author.is_none());
    }

    #[tokio::test]
    async fn test_exists_missing_story_is_client_error() {
        let story_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<story::Model>::new()]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_over(story_db, user_db, session_db);
        let result = service.exists(404).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_rejects_non_owner() {
        let nonce = vec![5; 256];
        let story_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_story("story1", 7, "someone-else")]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session("user1", nonce.clone())]]);

        let service = service_over(story_db, user_db, session_db);
        let result = service.delete(&encode_token(&nonce), 7).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_by_owner_succeeds() {
        let nonce = vec![6; 256];
        let story_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_story("story1", 7, "user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres);
        let session_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_session("user1", nonce.clone())]]);

        let service = service_over(story_db, user_db, session_db);
        service.delete(&encode_token(&nonce), 7).await.unwrap();
    }

    // join_authors tests

    #[test]
    fn test_join_authors_preserves_duplicates() {
        let stories = vec![
            create_test_story("s1", 1, "user1"),
            create_test_story("s2", 2, "user1"),
            create_test_story("s3", 3, "user2"),
        ];
        let authors = vec![
            create_test_user("user1", "alice"),
            create_test_user("user2", "bob"),
        ];

        let feed = join_authors(stories, &authors).unwrap();

        let names: Vec<&str> = feed.iter().map(|f| f.author.as_str()).collect();
        assert_eq!(names, ["alice", "alice", "bob"]);
    }

    #[test]
    fn test_join_authors_missing_author_is_server_error() {
        let stories = vec![create_test_story("s1", 1, "ghost")];
        let authors = vec![create_test_user("user1", "alice")];

        let result = join_authors(stories, &authors);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
