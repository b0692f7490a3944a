//! Vote service.
//!
//! Latest-wins voting with history retained: casting over an earlier vote
//! flips the old record inactive and inserts a fresh active one, so every
//! vote change stays auditable without a separate log.

use chrono::Utc;
use dynstory_common::{AppError, AppResult, IdGenerator};
use dynstory_db::{entities::vote, repositories::VoteRepository};
use sea_orm::Set;

/// Number of answer choices on every question.
pub const ANSWER_CHOICES: usize = 5;

/// Vote service for the append-only vote ledger.
#[derive(Clone)]
pub struct VoteService {
    votes: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(votes: VoteRepository) -> Self {
        Self {
            votes,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote, replacing any earlier vote by the same user on the same
    /// question.
    ///
    /// Does not check that the user, question or story exist; callers
    /// confirm that beforehand.
    pub async fn cast(
        &self,
        user_id: &str,
        question_id: &str,
        answer: i32,
        story_pretty_id: i64,
    ) -> AppResult<()> {
        let existing = self.votes.find_active(user_id, question_id).await?;

        if existing.is_none() {
            self.insert(user_id, question_id, answer, story_pretty_id)
                .await?;
            return Ok(());
        }

        // Vote change: deactivate the old record and insert the new one as
        // two concurrent, unordered writes. A crash in between can leave
        // zero or two active records for this pair; the state heals on the
        // next cast, and count() tolerates it meanwhile.
        let (deactivated, inserted) = tokio::join!(
            self.votes.deactivate(user_id, question_id),
            self.insert(user_id, question_id, answer, story_pretty_id),
        );
        deactivated?;
        inserted?;

        Ok(())
    }

    /// The user's current active vote on a question, if any.
    pub async fn get(&self, user_id: &str, question_id: &str) -> AppResult<Option<vote::Model>> {
        self.votes.find_active(user_id, question_id).await
    }

    /// Per-answer counts of active votes on a question.
    ///
    /// A question nobody has voted on, or that does not exist at all,
    /// yields all zeros rather than an error.
    pub async fn count(&self, question_id: &str) -> AppResult<[u64; ANSWER_CHOICES]> {
        let answers = self.votes.active_answers_for_question(question_id).await?;

        let mut counts = [0u64; ANSWER_CHOICES];
        for answer in answers {
            if let Some(slot) = usize::try_from(answer)
                .ok()
                .and_then(|i| counts.get_mut(i))
            {
                *slot += 1;
            }
        }

        Ok(counts)
    }

    async fn insert(
        &self,
        user_id: &str,
        question_id: &str,
        answer: i32,
        story_pretty_id: i64,
    ) -> AppResult<vote::Model> {
        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            question_id: Set(question_id.to_string()),
            answer: Set(answer),
            story_pretty_id: Set(story_pretty_id),
            is_latest: Set(true),
            created_at: Set(Utc::now().into()),
        };

        self.votes.create(model).await
    }
}
