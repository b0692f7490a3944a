//! Question service.
//!
//! Every question carries exactly five answer choices. Fetching a question
//! bundles its per-answer vote counts and, for a logged-in viewer, their own
//! active vote; casting a vote verifies the caller, the question and the
//! originating story before touching the ledger.

use chrono::Utc;
use dynstory_common::{AppError, AppResult, IdGenerator};
use dynstory_db::{entities::question, repositories::QuestionRepository};
use sea_orm::Set;
use serde_json::json;

use crate::{ANSWER_CHOICES, SessionService, StoryService, VoteService};

/// Longest permitted answer choice, in characters.
const ANSWER_MAX_LEN: usize = 100;

/// Question service for creation, display and voting.
#[derive(Clone)]
pub struct QuestionService {
    questions: QuestionRepository,
    sessions: SessionService,
    votes: VoteService,
    stories: StoryService,
    id_gen: IdGenerator,
}

/// One answer choice with its active-vote count.
pub struct AnswerCount {
    /// The answer text.
    pub name: String,
    /// Active votes for it.
    pub votes: u64,
}

/// A question prepared for display.
pub struct QuestionWithVotes {
    /// Question title.
    pub title: String,
    /// The five answers with their counts.
    pub answers: Vec<AnswerCount>,
    /// The viewer's active answer index, when known.
    pub user_vote: Option<i32>,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        questions: QuestionRepository,
        sessions: SessionService,
        votes: VoteService,
        stories: StoryService,
    ) -> Self {
        Self {
            questions,
            sessions,
            votes,
            stories,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a question, returning its ID.
    pub async fn create(
        &self,
        title: &str,
        answers: &[String],
        author_id: &str,
    ) -> AppResult<String> {
        if answers.len() != ANSWER_CHOICES {
            return Err(AppError::BadRequest(
                "Answers field must have five elements.".to_string(),
            ));
        }
        for answer in answers {
            let len = answer.chars().count();
            if len == 0 || len > ANSWER_MAX_LEN {
                return Err(AppError::BadRequest(
                    "Question answers do not meet length requirements.".to_string(),
                ));
            }
        }
        if let Some(duplicate) = find_duplicate(answers) {
            return Err(AppError::BadRequest(format!(
                "You have several answers labeled \"{duplicate}.\" Please make them different."
            )));
        }

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title.to_string()),
            answers: Set(json!(answers)),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let question = self.questions.create(model).await?;
        Ok(question.id)
    }

    /// Fetch a question with its vote counts and, when a token is supplied,
    /// the viewer's own active vote.
    ///
    /// A stale or expired token is not an error here; the viewer simply
    /// gets no vote back.
    pub async fn get(&self, question_id: &str, token: Option<&str>) -> AppResult<QuestionWithVotes> {
        let (question, counts, user_vote) = tokio::join!(
            self.questions.get_by_id(question_id),
            self.votes.count(question_id),
            self.viewer_vote(question_id, token),
        );

        let question = question?;
        let counts = counts?;
        let user_vote = user_vote?;

        let names: Vec<String> = serde_json::from_value(question.answers)
            .map_err(|e| AppError::Internal(format!("Invalid stored answers: {e}")))?;

        let answers = names
            .into_iter()
            .zip(counts)
            .map(|(name, votes)| AnswerCount { name, votes })
            .collect();

        Ok(QuestionWithVotes {
            title: question.title,
            answers,
            user_vote,
        })
    }

    /// Cast a vote on a question from a story page.
    ///
    /// Verifies the session, the question and the story in parallel; only
    /// then touches the vote ledger.
    pub async fn vote(
        &self,
        token: &str,
        question_id: &str,
        answer: i32,
        story_pretty_id: i64,
    ) -> AppResult<()> {
        if !(0..ANSWER_CHOICES as i32).contains(&answer) {
            return Err(AppError::BadRequest(
                "Answer must be between 0 and 4.".to_string(),
            ));
        }

        let (user_id, (), ()) = tokio::try_join!(
            self.sessions.resolve(token),
            self.question_exists(question_id),
            self.stories.exists(story_pretty_id),
        )?;

        self.votes
            .cast(&user_id, question_id, answer, story_pretty_id)
            .await
    }

    async fn question_exists(&self, question_id: &str) -> AppResult<()> {
        self.questions
            .find_by_id(question_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("That question doesn't exist.".to_string()))
    }

    async fn viewer_vote(&self, question_id: &str, token: Option<&str>) -> AppResult<Option<i32>> {
        let Some(token) = token else {
            return Ok(None);
        };

        match self.sessions.resolve(token).await {
            // An expunged or expired login is not a failure for display
            // purposes.
            Err(_) => Ok(None),
            Ok(user_id) => Ok(self
                .votes
                .get(&user_id, question_id)
                .await?
                .map(|v| v.answer)),
        }
    }
}

fn find_duplicate(answers: &[String]) -> Option<&str> {
    for (i, answer) in answers.iter().enumerate() {
        if answers[..i].contains(answer) {
            return Some(answer);
        }
    }
    None
}
