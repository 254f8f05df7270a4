//! HTTP API surface: handlers, request/response models, and OpenAPI docs.

pub mod handlers;
pub mod models;

use crate::errors::Error;
use axum::extract::FromRequest;
use utoipa::OpenApi;

/// JSON extractor whose rejection maps into the service error taxonomy, so a
/// malformed body answers 400 with an `{"error": ...}` payload instead of
/// axum's default 422.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

#[derive(OpenApi)]
#[openapi(
    info(title = "userd", description = "User directory CRUD API"),
    paths(
        handlers::users::index,
        handlers::users::setup_database,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        models::MessageResponse,
        models::users::UserCreate,
        models::users::UserUpdate,
        models::users::UserResponse,
        models::users::UserCreated,
    ))
)]
pub struct ApiDoc;
