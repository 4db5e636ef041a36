use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::models::{Community, RosterEntry};
use crate::error::AppError;
use crate::riot::Region;
use crate::traits::IdentityStore;

const ROSTER_COLUMNS: &str = "display_name, external_id, community_id, region";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // === Community operations ===

    /// Registers the community with the given defaults. An existing configuration is kept.
    pub async fn register_community(
        &self,
        community_id: &str,
        region: Region,
        prefix: &str,
    ) -> Result<Community, AppError> {
        sqlx::query(
            "INSERT INTO community_config (community_id, region, prefix) VALUES (?, ?, ?)
            ON CONFLICT(community_id) DO NOTHING",
        )
        .bind(community_id)
        .bind(region.as_str())
        .bind(prefix)
        .execute(&self.pool)
        .await?;

        self.community_config(community_id).await
    }

    pub async fn get_community(&self, community_id: &str) -> Result<Option<Community>, AppError> {
        let community = sqlx::query_as::<_, Community>(
            "SELECT community_id, region, prefix FROM community_config WHERE community_id = ?",
        )
        .bind(community_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(community)
    }

    /// Drops the configuration and the whole roster. Returns whether the community existed.
    pub async fn deregister_community(&self, community_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let entries = sqlx::query("DELETE FROM roster_entry WHERE community_id = ?")
            .bind(community_id)
            .execute(&mut *tx)
            .await?;
        let config = sqlx::query("DELETE FROM community_config WHERE community_id = ?")
            .bind(community_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            community_id,
            removed_entries = entries.rows_affected(),
            "🗄️ Community deregistered"
        );
        Ok(config.rows_affected() > 0)
    }

    pub async fn set_region(&self, community_id: &str, region: Region) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE community_config SET region = ? WHERE community_id = ?")
            .bind(region.as_str())
            .bind(community_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CommunityNotConfigured(community_id.to_string()));
        }
        Ok(())
    }

    pub async fn set_prefix(&self, community_id: &str, prefix: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE community_config SET prefix = ? WHERE community_id = ?")
            .bind(prefix)
            .bind(community_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CommunityNotConfigured(community_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for Repository {
    async fn community_config(&self, community_id: &str) -> Result<Community, AppError> {
        self.get_community(community_id)
            .await?
            .ok_or_else(|| AppError::CommunityNotConfigured(community_id.to_string()))
    }

    async fn list_roster(&self, community_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        let entries = sqlx::query_as::<_, RosterEntry>(&format!(
            "SELECT {ROSTER_COLUMNS} FROM roster_entry WHERE community_id = ? ORDER BY id ASC"
        ))
        .bind(community_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_roster_entry(&self, entry: &RosterEntry) -> Result<(), AppError> {
        let result = sqlx::query(&format!(
            "INSERT INTO roster_entry ({ROSTER_COLUMNS}) VALUES (?, ?, ?, ?)"
        ))
        .bind(&entry.display_name)
        .bind(&entry.external_id)
        .bind(&entry.community_id)
        .bind(entry.region.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::AlreadyTracked(entry.display_name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_roster_entry(
        &self,
        community_id: &str,
        region: Region,
        display_name: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM roster_entry WHERE id = (
                SELECT id FROM roster_entry
                WHERE community_id = ? AND region = ? AND display_name = ?
                ORDER BY id ASC
                LIMIT 1
            )
            "#,
        )
        .bind(community_id)
        .bind(region.as_str())
        .bind(display_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PlayerNotTracked(display_name.to_string()));
        }
        Ok(())
    }

    async fn remove_all_roster_entries(&self, community_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM roster_entry WHERE community_id = ?")
            .bind(community_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_display_name(
        &self,
        entry: &RosterEntry,
        new_name: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE roster_entry SET display_name = ?
            WHERE community_id = ? AND region = ? AND external_id = ? AND display_name = ?
            "#,
        )
        .bind(new_name)
        .bind(&entry.community_id)
        .bind(entry.region.as_str())
        .bind(&entry.external_id)
        .bind(&entry.display_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PlayerNotTracked(entry.display_name.clone()));
        }
        Ok(())
    }

    async fn update_external_id(
        &self,
        entry: &RosterEntry,
        new_id: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE roster_entry SET external_id = ?
            WHERE community_id = ? AND region = ? AND external_id = ? AND display_name = ?
            "#,
        )
        .bind(new_id)
        .bind(&entry.community_id)
        .bind(entry.region.as_str())
        .bind(&entry.external_id)
        .bind(&entry.display_name)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(AppError::PlayerNotTracked(entry.display_name.clone()))
            }
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::AlreadyTracked(entry.display_name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
