//! API request handlers.

pub mod users;
