//! Database repositories.

mod feedback;
mod pretty_id_counter;
mod question;
mod session;
mod story;
mod user;
mod vote;

pub use feedback::FeedbackRepository;
pub use pretty_id_counter::CounterRepository;
pub use question::QuestionRepository;
pub use session::SessionRepository;
pub use story::StoryRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
