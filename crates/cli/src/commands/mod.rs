//! Database commands.
//!
//! Each command loads [`ServerConfig`] from the environment and opens a
//! short-lived pool of its own.

use sqlx::PgPool;
use thiserror::Error;

use orders_api_server::config::{ConfigError, ServerConfig};
use orders_api_server::db::{self, RepositoryError, schema};

/// Tables the API needs, in creation order.
const TABLES: &[&str] = &["users", "products", "orders", "order_products"];

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] RepositoryError),

    #[error("Missing tables: {0}; run `orders-cli init-db`")]
    MissingTables(String),
}

async fn connect() -> Result<PgPool, CommandError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    // One connection is enough for a single sequential command
    Ok(db::create_pool(&config.database_url, 1).await?)
}

/// Create every missing table.
///
/// # Errors
///
/// Returns `CommandError` if configuration is missing or a statement fails.
pub async fn init_db() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating tables...");
    schema::initialize(&pool).await?;

    tracing::info!(tables = ?TABLES, "Database tables created");
    pool.close().await;
    Ok(())
}

/// Verify connectivity and that every table exists.
///
/// # Errors
///
/// Returns `CommandError::MissingTables` naming any table that is absent.
pub async fn check() -> Result<(), CommandError> {
    let pool = connect().await?;

    let (version,): (String,) = sqlx::query_as("SELECT version()")
        .fetch_one(&pool)
        .await?;
    tracing::info!(%version, "Database reachable");

    let mut missing = Vec::new();
    for table in TABLES {
        let (present,): (bool,) = sqlx::query_as("SELECT to_regclass($1) IS NOT NULL")
            .bind(format!("public.{table}"))
            .fetch_one(&pool)
            .await?;

        if present {
            tracing::info!(table, "Table present");
        } else {
            tracing::warn!(table, "Table missing");
            missing.push(*table);
        }
    }

    pool.close().await;

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CommandError::MissingTables(missing.join(", ")))
    }
}
