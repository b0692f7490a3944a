//! Feedback service.
//!
//! Feedback reaches the team by email, with an audit copy persisted
//! alongside. Without SMTP configured the whole operation refuses up front.

use chrono::Utc;
use dynstory_common::{AppError, AppResult, IdGenerator};
use dynstory_db::{
    entities::feedback,
    repositories::{FeedbackRepository, UserRepository},
};
use sea_orm::Set;

use crate::{EmailService, SessionService};

/// Feedback service.
#[derive(Clone)]
pub struct FeedbackService {
    feedback: FeedbackRepository,
    users: UserRepository,
    sessions: SessionService,
    email: EmailService,
    id_gen: IdGenerator,
}

impl FeedbackService {
    /// Create a new feedback service.
    #[must_use]
    pub const fn new(
        feedback: FeedbackRepository,
        users: UserRepository,
        sessions: SessionService,
        email: EmailService,
    ) -> Self {
        Self {
            feedback,
            users,
            sessions,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    /// Deliver a feedback message from the session's owner.
    pub async fn submit(&self, token: &str, text: &str) -> AppResult<()> {
        if !self.email.is_enabled() {
            return Err(AppError::Email(
                "Feedback received, but SMTP is not configured.".to_string(),
            ));
        }

        let owner_id = self.sessions.resolve(token).await?;
        let user = self.users.get_by_id(&owner_id).await?;

        let body = feedback_body(&user.username, &user.email, text);

        let record = feedback::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(owner_id),
            message: Set(body.clone()),
            created_at: Set(Utc::now().into()),
        };

        // Email dispatch and the audit insert are independent; both must
        // succeed.
        tokio::try_join!(
            self.email.send_feedback(&user.username, &user.email, &body),
            self.feedback.create(record),
        )?;

        Ok(())
    }
}

/// Plain-text email body: submitter identity header plus the escaped
/// message.
fn feedback_body(username: &str, email: &str, text: &str) -> String {
    format!(
        "Username: {username}\nEmail: {email}\n\n{}",
        escape_html(text)
    )
}

/// HTML-escape user-supplied text before it lands in a mailbox.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dynstory_db::repositories::SessionRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_without_smtp() -> FeedbackService {
        let db = || Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        FeedbackService::new(
            FeedbackRepository::new(db()),
            UserRepository::new(db()),
            SessionService::new(SessionRepository::new(db())),
            EmailService::new(None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_submit_without_smtp_is_server_error() {
        let service = service_without_smtp();
        let result = service.submit("irrelevant-token", "Great site!").await;

        assert!(matches!(result, Err(AppError::Email(_))));
    }

    #[test]
    fn test_feedback_body_carries_identity_header() {
        let body = feedback_body("alice", "alice@example.com", "Great site!");
        assert!(body.starts_with("Username: alice\nEmail: alice@example.com\n\n"));
        assert!(body.ends_with("Great site!"));
    }

    #[test]
    fn test_feedback_body_escapes_markup() {
        let body = feedback_body("alice", "alice@example.com", "<script>&'\"/");
        assert!(body.contains("&lt;script&gt;&amp;&#x27;&quot;&#x2F;"));
        assert!(!body.contains("<script>"));
    }
}
