use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS community_config (
    community_id TEXT PRIMARY KEY,
    region TEXT NOT NULL,
    prefix TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE TABLE IF NOT EXISTS roster_entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name TEXT NOT NULL,
    external_id TEXT NOT NULL,
    community_id TEXT NOT NULL,
    region TEXT NOT NULL,
    added_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_roster_entry_account
    ON roster_entry(community_id, external_id, region);
CREATE INDEX IF NOT EXISTS idx_roster_entry_community ON roster_entry(community_id);
"#;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("🗄️ Database migrations completed");
    Ok(())
}
