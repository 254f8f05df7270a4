//! Repository implementations for CRUD operations.

pub mod repository;
pub mod users;

pub use repository::Repository;
pub use users::Users;
