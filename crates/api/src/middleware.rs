//! Shared application state.

use dynstory_core::{
    AccountService, EmailService, FeedbackService, QuestionService, SessionService, StoryService,
};

/// Application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Account lifecycle operations.
    pub account_service: AccountService,
    /// Session lifecycle operations.
    pub session_service: SessionService,
    /// Story and feed operations.
    pub story_service: StoryService,
    /// Question display and voting.
    pub question_service: QuestionService,
    /// Feedback delivery.
    pub feedback_service: FeedbackService,
    /// Outbound email (activation mail dispatch).
    pub email_service: EmailService,
}
