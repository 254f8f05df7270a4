//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified via
//! the `-f` flag or the `USERD_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Built-in defaults** - suitable for local/containerized use only
//! 2. **YAML config file** - base configuration (default: `config.yaml`)
//! 3. **`USERD_*` environment variables** - double underscores address nested
//!    values, e.g. `USERD_DATABASE__HOST=db.internal`
//! 4. **`DB_*` environment variables** - `DB_HOST`, `DB_PORT`, `DB_NAME`,
//!    `DB_USER` and `DB_PASSWORD` map onto the `database` section
//!
//! ```bash
//! # Override server port
//! USERD_PORT=8080
//!
//! # Point at a different PostgreSQL instance
//! DB_HOST=localhost DB_PORT=5433 DB_PASSWORD=secret userd
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "USERD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults defined in the `Default` implementation, so the
/// service starts with no config file at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database: DatabaseConfig::default(),
        }
    }
}

/// PostgreSQL connection settings.
///
/// The defaults match a local docker-compose style setup; real deployments
/// must override the credential via the environment, never a checked-in file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database server hostname
    pub host: String,
    /// Database server port
    pub port: u16,
    /// Database name
    pub name: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "postgres-db".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    fn figment(args: &Args) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("USERD_").split("__"))
            // DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASSWORD land in the
            // database section
            .merge(
                Env::prefixed("DB_")
                    .only(&["host", "port", "name", "user", "password"])
                    .map(|key| format!("database.{}", key.as_str().to_lowercase()).into()),
            )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_args() -> Args {
        Args {
            config: "config.yaml".to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults() {
        figment::Jail::expect_with(|_| {
            let config = Config::load(&test_args()).unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 5000);
            assert_eq!(config.database.host, "postgres-db");
            assert_eq!(config.database.port, 5432);
            assert_eq!(config.database.name, "postgres");
            assert_eq!(config.database.user, "postgres");
            Ok(())
        });
    }

    #[test]
    fn test_db_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DB_HOST", "localhost");
            jail.set_env("DB_PORT", "5433");
            jail.set_env("DB_NAME", "userd_test");
            jail.set_env("DB_PASSWORD", "hunter2");
            let config = Config::load(&test_args()).unwrap();
            assert_eq!(config.database.host, "localhost");
            assert_eq!(config.database.port, 5433);
            assert_eq!(config.database.name, "userd_test");
            assert_eq!(config.database.password, "hunter2");
            Ok(())
        });
    }

    #[test]
    fn test_nested_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("USERD_PORT", "8080");
            jail.set_env("USERD_DATABASE__HOST", "db.internal");
            let config = Config::load(&test_args()).unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.database.host, "db.internal");
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overridden_by_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9000
                database:
                  host: from-yaml
                "#,
            )?;
            jail.set_env("DB_HOST", "from-env");
            let config = Config::load(&test_args()).unwrap();
            assert_eq!(config.port, 9000);
            assert_eq!(config.database.host, "from-env");
            Ok(())
        });
    }
}
