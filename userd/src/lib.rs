//! # userd: a user-directory CRUD service
//!
//! `userd` exposes create/read/update/delete operations over a single `user`
//! entity backed by PostgreSQL. The interesting part is the request-to-query
//! mapping layer: request validation, parameterized SQL construction
//! (including a dynamic partial-update builder), per-request connection
//! lifecycle, and translation of database outcomes into a fixed error
//! taxonomy with stable HTTP status codes.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum); all
//! persistence goes through SQLx against PostgreSQL. An inbound request flows
//! handler → repository → connection → database, and failures flow back
//! through [`errors::Error`], which renders every error as
//! `{"error": "<message>"}` with its mapped status code.
//!
//! The **API layer** ([`api`]) holds the route handlers and their
//! request/response models, plus the OpenAPI document served at `/docs`.
//!
//! The **database layer** ([`db`]) uses the repository pattern: the `users`
//! repository runs parameterized queries over a connection it borrows, and a
//! `Database` provider opens one fresh autocommit connection per request.
//! There is deliberately no pool and no cross-request state; the store is the
//! single source of truth.
//!
//! Configuration ([`config`]) is an explicit struct loaded once at startup
//! from defaults, an optional YAML file, and environment overrides, then
//! passed into the connection provider.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;

pub use config::Config;

use api::ApiDoc;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: Arc<Config>,
}

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::handlers::users::index))
        .route("/setup", get(api::handlers::users::setup_database))
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}", put(api::handlers::users::update_user))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance from loaded configuration
    pub fn new(config: Config) -> Self {
        let state = AppState {
            db: db::Database::new(&config.database),
            config: Arc::new(config.clone()),
        };
        let router = build_router(state);

        Self { router, config }
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("userd listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
