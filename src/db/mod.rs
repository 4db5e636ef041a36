mod migrations;
mod models;
mod repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use migrations::run_migrations;
pub use models::{Community, RosterEntry};
pub use repository::Repository;

use crate::error::AppError;

/// Opens the pool, creating the database file when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Fresh in-memory repository with the schema applied.
#[cfg(test)]
pub(crate) async fn test_repository() -> Repository {
    // A single connection, since every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    Repository::new(pool)
}
