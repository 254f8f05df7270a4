//! Database models for users.

use crate::api::models::users::{UserCreate, UserUpdate};
use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Row model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    /// Nullable in the DDL; populated by the column default in practice
    pub created_at: Option<NaiveDateTime>,
}

/// Insert request: the store assigns `id` and `created_at`
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

impl From<UserCreate> for UserCreateDBRequest {
    fn from(create: UserCreate) -> Self {
        Self {
            name: create.name,
            email: create.email,
            age: create.age,
        }
    }
}

/// Partial update request. `None` means "leave untouched"; for `age`,
/// `Some(None)` means "set to NULL".
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<Option<i32>>,
}

impl UserUpdateDBRequest {
    /// True when no recognized field is present, i.e. there is nothing to put
    /// in a SET clause.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

impl From<UserUpdate> for UserUpdateDBRequest {
    fn from(update: UserUpdate) -> Self {
        Self {
            name: update.name,
            email: update.email,
            age: update.age,
        }
    }
}
