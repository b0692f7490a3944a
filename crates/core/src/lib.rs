//! Core business logic for dynstory.

pub mod services;

pub use services::*;
