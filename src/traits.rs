//! Seams between the roster/ranking logic and its two collaborators: the
//! persistent roster store and the remote ladder service.

use async_trait::async_trait;

use crate::db::{Community, RosterEntry};
use crate::error::AppError;
use crate::ranking::RankEntry;
use crate::riot::{Region, RiotApiResponse};

/// Persistent roster records and per-community configuration.
///
/// Every mutation is atomic for the single record it touches.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fails with [`AppError::CommunityNotConfigured`] when the community never registered.
    async fn community_config(&self, community_id: &str) -> Result<Community, AppError>;

    /// All entries of the community, in insertion order.
    async fn list_roster(&self, community_id: &str) -> Result<Vec<RosterEntry>, AppError>;

    /// Fails with [`AppError::AlreadyTracked`] when `(external_id, region)` is already
    /// present in the community.
    async fn insert_roster_entry(&self, entry: &RosterEntry) -> Result<(), AppError>;

    /// Removes exactly one entry with this stored name in the region.
    async fn remove_roster_entry(
        &self,
        community_id: &str,
        region: Region,
        display_name: &str,
    ) -> Result<(), AppError>;

    async fn remove_all_roster_entries(&self, community_id: &str) -> Result<u64, AppError>;

    /// Renames the stored entry matching `entry` exactly.
    async fn update_display_name(
        &self,
        entry: &RosterEntry,
        new_name: &str,
    ) -> Result<(), AppError>;

    /// Re-points the stored entry matching `entry` exactly to `new_id`.
    async fn update_external_id(&self, entry: &RosterEntry, new_id: &str)
    -> Result<(), AppError>;
}

/// The remote ranked-ladder service. Any failure, including a timeout, is a lookup failure.
#[async_trait]
pub trait RankingClient: Send + Sync {
    async fn resolve_id_by_name(&self, region: Region, display_name: &str)
    -> RiotApiResponse<String>;

    async fn resolve_name_by_id(&self, region: Region, external_id: &str)
    -> RiotApiResponse<String>;

    /// Empty when the account has no ranked standing.
    async fn fetch_rank_entries(
        &self,
        region: Region,
        external_id: &str,
    ) -> RiotApiResponse<Vec<RankEntry>>;
}
