//! CRUD handlers for the user entity.
//!
//! Every handler follows the same per-request pipeline: validate the input
//! shape, acquire a fresh store connection, run the repository operation, and
//! translate the outcome into a response. The connection is dropped (and
//! therefore closed) on every exit path, error paths included.

use crate::AppState;
use crate::api::Json;
use crate::api::models::MessageResponse;
use crate::api::models::users::{UserCreate, UserCreated, UserResponse, UserUpdate};
use crate::db;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserUpdateDBRequest};
use crate::errors::{Error, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;

fn user_not_found() -> Error {
    Error::NotFound {
        resource: "User".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Liveness check",
    responses((status = 200, description = "Service is running", body = MessageResponse))
)]
pub async fn index() -> axum::Json<MessageResponse> {
    axum::Json(MessageResponse::new("User API is running"))
}

#[utoipa::path(
    get,
    path = "/setup",
    tag = "setup",
    summary = "Create the users table if it does not exist",
    responses(
        (status = 200, description = "Setup complete", body = MessageResponse),
        (status = 500, description = "Setup failed")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn setup_database(State(state): State<AppState>) -> Result<axum::Json<MessageResponse>> {
    let mut conn = state.db.acquire().await?;
    db::ensure_schema(&mut conn).await?;

    Ok(axum::Json(MessageResponse::new("Database setup complete")))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    responses(
        (status = 200, description = "All users, possibly empty", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<axum::Json<Vec<UserResponse>>> {
    let mut conn = state.db.acquire().await?;
    let mut repo = Users::new(&mut conn);

    let users = repo.list().await?;

    Ok(axum::Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> Result<axum::Json<UserResponse>> {
    let mut conn = state.db.acquire().await?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(id).await?.ok_or_else(user_not_found)?;

    Ok(axum::Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserCreated),
        (status = 400, description = "Missing required fields or duplicate email"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(create): Json<UserCreate>,
) -> Result<(StatusCode, axum::Json<UserCreated>)> {
    if create.name.trim().is_empty() || create.email.trim().is_empty() {
        return Err(Error::Validation {
            message: "Name and email are required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await?;
    let mut repo = Users::new(&mut conn);

    let user = repo.create(&UserCreateDBRequest::from(create)).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(UserCreated {
            id: user.id,
            message: "User created successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    summary = "Partially update user",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "No recognized fields present, or duplicate email"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<UserUpdate>,
) -> Result<axum::Json<MessageResponse>> {
    let request = UserUpdateDBRequest::from(update);
    if request.is_empty() {
        return Err(Error::Validation {
            message: "No valid fields to update".to_string(),
        });
    }

    let mut conn = state.db.acquire().await?;
    let mut repo = Users::new(&mut conn);

    repo.update(id, &request).await?;

    Ok(axum::Json(MessageResponse::new("User updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i32>) -> Result<axum::Json<MessageResponse>> {
    let mut conn = state.db.acquire().await?;
    let mut repo = Users::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(user_not_found());
    }

    Ok(axum::Json(MessageResponse::new("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::db::Database;
    use crate::{AppState, build_router};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use std::sync::Arc;

    /// Spin up a TestServer whose per-request connections target the
    /// per-test database provided by #[sqlx::test].
    async fn test_server(pool: &PgPool) -> TestServer {
        let mut conn = pool.acquire().await.unwrap();
        crate::db::ensure_schema(&mut conn).await.unwrap();
        drop(conn);

        let state = AppState {
            db: Database::from_options((*pool.connect_options()).clone()),
            config: Arc::new(Config::default()),
        };

        TestServer::new(build_router(state)).expect("Failed to create test server")
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_liveness(pool: PgPool) {
        let server = test_server(&pool).await;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "User API is running");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_setup_is_idempotent(pool: PgPool) {
        let server = test_server(&pool).await;

        for _ in 0..2 {
            let response = server.get("/setup").await;
            response.assert_status_ok();
            assert_eq!(response.json::<Value>()["message"], "Database setup complete");
        }
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_full_crud_scenario(pool: PgPool) {
        let server = test_server(&pool).await;

        // Create
        let response = server
            .post("/users")
            .json(&json!({"name": "John Doe", "email": "john@x.com", "age": 30}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "User created successfully");
        let id = body["id"].as_i64().unwrap();

        // Fetch it back
        let response = server.get(&format!("/users/{id}")).await;
        response.assert_status_ok();
        let user = response.json::<Value>();
        assert_eq!(user["name"], "John Doe");
        assert_eq!(user["email"], "john@x.com");
        assert_eq!(user["age"], 30);
        assert!(user["created_at"].is_string());

        // Partial update leaves the other fields alone
        let response = server.put(&format!("/users/{id}")).json(&json!({"age": 31})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "User updated successfully");

        let user = server.get(&format!("/users/{id}")).await.json::<Value>();
        assert_eq!(user["age"], 31);
        assert_eq!(user["name"], "John Doe");

        // Delete, then every lookup answers 404
        let response = server.delete(&format!("/users/{id}")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "User deleted successfully");

        let response = server.get(&format!("/users/{id}")).await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "User not found");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_list_round_trip(pool: PgPool) {
        let server = test_server(&pool).await;

        let response = server.get("/users").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>().as_array().unwrap().len(), 0);

        let id = server
            .post("/users")
            .json(&json!({"name": "Ada", "email": "ada@x.com"}))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();

        let users = server.get("/users").await.json::<Value>();
        let matches = users
            .as_array()
            .unwrap()
            .iter()
            .filter(|u| u["id"].as_i64() == Some(id))
            .count();
        assert_eq!(matches, 1);

        server.delete(&format!("/users/{id}")).await.assert_status_ok();
        let users = server.get("/users").await.json::<Value>();
        assert!(users.as_array().unwrap().iter().all(|u| u["id"].as_i64() != Some(id)));
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_create_missing_fields(pool: PgPool) {
        let server = test_server(&pool).await;

        // Missing email never reaches the store
        let response = server.post("/users").json(&json!({"name": "No Email"})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());

        // Present but empty is rejected too
        let response = server.post("/users").json(&json!({"name": "", "email": "x@x.com"})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Name and email are required");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_duplicate_email_conflict(pool: PgPool) {
        let server = test_server(&pool).await;

        let payload = json!({"name": "First", "email": "dup@x.com"});
        server.post("/users").json(&payload).await.assert_status(axum::http::StatusCode::CREATED);

        let response = server.post("/users").json(&json!({"name": "Second", "email": "dup@x.com"})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Email already exists");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_update_validation(pool: PgPool) {
        let server = test_server(&pool).await;

        let id = server
            .post("/users")
            .json(&json!({"name": "Val", "email": "val@x.com", "age": 20}))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();

        // Empty body: nothing to update
        let response = server.put(&format!("/users/{id}")).json(&json!({})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "No valid fields to update");

        // Only unknown fields present is the same as empty
        let response = server.put(&format!("/users/{id}")).json(&json!({"nickname": "v"})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);

        // Row is unchanged after the rejected updates
        let user = server.get(&format!("/users/{id}")).await.json::<Value>();
        assert_eq!(user["age"], 20);

        // Unknown fields alongside a recognized one are ignored
        let response = server
            .put(&format!("/users/{id}"))
            .json(&json!({"age": 21, "nickname": "v"}))
            .await;
        response.assert_status_ok();
        let user = server.get(&format!("/users/{id}")).await.json::<Value>();
        assert_eq!(user["age"], 21);
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_update_duplicate_email(pool: PgPool) {
        let server = test_server(&pool).await;

        server
            .post("/users")
            .json(&json!({"name": "Holder", "email": "taken@x.com"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        let id = server
            .post("/users")
            .json(&json!({"name": "Mover", "email": "mover@x.com"}))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();

        let response = server.put(&format!("/users/{id}")).json(&json!({"email": "taken@x.com"})).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Email already exists");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_unknown_id_answers_404(pool: PgPool) {
        let server = test_server(&pool).await;

        let response = server.get("/users/9999").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);

        let response = server.put("/users/9999").json(&json!({"name": "Ghost"})).await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "User not found");

        let response = server.delete("/users/9999").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
