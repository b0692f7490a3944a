//! Business-logic services.

pub mod account;
pub mod email;
pub mod feedback;
pub mod pretty_id;
pub mod question;
pub mod session;
pub mod story;
pub mod vote;

pub use account::AccountService;
pub use email::EmailService;
pub use feedback::FeedbackService;
pub use pretty_id::PrettyIdClient;
pub use question::{AnswerCount, QuestionService, QuestionWithVotes};
pub use session::SessionService;
pub use story::{FeedStory, StoryService, StoryWithAuthor};
pub use vote::{ANSWER_CHOICES, VoteService};
