//! Common utilities and shared types for dynstory.
//!
//! This crate provides foundational components used across all dynstory
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Token codec**: Session token encoding via [`encode_token`] and
//!   [`decode_token`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use dynstory_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use token::{decode_token, encode_token};

/// Upper bound on attempts to generate a unique random identifier (session
/// nonces and activation IDs) before the failure is treated as systemic.
pub const MAX_NONCE_ATTEMPTS: u32 = 5;
