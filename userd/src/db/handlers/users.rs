//! Database repository for users.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{User, UserCreateDBRequest, UserUpdateDBRequest},
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = User;
    type Id = i32;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Values travel only as bind parameters; a duplicate email surfaces
        // as DbError::UniqueViolation via the store's constraint
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, age) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.age)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        // Store-default order, no filter
        let users = sqlx::query_as::<_, User>("SELECT * FROM users")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    /// Dynamic partial update: assembles the SET clause from only the fields
    /// present in the request, in a fixed order (name, email, age) so the
    /// generated SQL is stable. Only column names are assembled textually;
    /// every value is a bind parameter.
    #[instrument(skip(self, request), fields(user_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Callers validate first; refuse to build a no-op statement regardless
        if request.is_empty() {
            return Err(DbError::Other(anyhow::anyhow!("update request has no fields to apply")));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");

        if let Some(name) = &request.name {
            assignments.push("name = ").push_bind_unseparated(name);
        }
        if let Some(email) = &request.email {
            assignments.push("email = ").push_bind_unseparated(email);
        }
        if let Some(age) = &request.age {
            // Some(None) binds NULL, clearing the column
            assignments.push("age = ").push_bind_unseparated(*age);
        }

        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        // No returned row means no row matched the id
        let user = builder
            .build_query_as::<User>()
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // RETURNING id distinguishes "not found" from "deleted"
        let deleted = sqlx::query_scalar::<_, i32>("DELETE FROM users WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(deleted.is_some())
    }
}
