//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the repository pattern: API handlers talk to repositories
//! ([`handlers`]), which run parameterized queries over row models
//! ([`models`]) and surface failures through [`errors::DbError`].
//!
//! Connection handling is deliberately simple: [`Database::acquire`] opens a
//! fresh connection per request, and each statement autocommits since no
//! explicit transaction is opened. The connection is closed when the handler
//! drops it, on success and error paths alike. Higher-throughput deployments
//! can put a pool behind the same acquire contract without touching the
//! repositories.

pub mod errors;
pub mod handlers;
pub mod models;

use errors::{DbError, Result};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor};

use crate::config::DatabaseConfig;

/// Connection provider: opens one connection per request from options built
/// once at startup.
#[derive(Debug, Clone)]
pub struct Database {
    options: PgConnectOptions,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        Self { options }
    }

    /// Build a provider from pre-assembled connect options (used by tests to
    /// point at a per-test database).
    pub fn from_options(options: PgConnectOptions) -> Self {
        Self { options }
    }

    /// Open a new connection. Failure is logged and returned as
    /// [`DbError::Connection`]; callers treat it as a normal outcome.
    pub async fn acquire(&self) -> Result<PgConnection> {
        match PgConnection::connect_with(&self.options).await {
            Ok(conn) => Ok(conn),
            Err(e) => {
                tracing::error!("Database connection error: {e}");
                Err(DbError::Connection { message: e.to_string() })
            }
        }
    }
}

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(100) UNIQUE NOT NULL,
    age INTEGER,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Idempotently ensure the users table exists. Safe to call repeatedly and
/// concurrently; only the first successful call has any effect.
pub async fn ensure_schema(conn: &mut PgConnection) -> Result<()> {
    conn.execute(CREATE_USERS_TABLE).await?;
    Ok(())
}
