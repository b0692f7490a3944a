//! Database entities.

pub mod feedback;
pub mod pretty_id_counter;
pub mod question;
pub mod session;
pub mod story;
pub mod user;
pub mod vote;

pub use feedback::Entity as Feedback;
pub use pretty_id_counter::Entity as PrettyIdCounter;
pub use question::Entity as Question;
pub use session::Entity as Session;
pub use story::Entity as Story;
pub use user::Entity as User;
pub use vote::Entity as Vote;
