use serde::Deserialize;
use thiserror::Error;

use crate::ranking::{Division, QueueType, RankEntry, Tier};

#[derive(Debug, Error)]
pub enum RiotApiError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP status error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Decoding raw response error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl RiotApiError {
    /// The service answered that the summoner does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(reqwest::StatusCode::NOT_FOUND))
    }
}

/// A call to the Riot API either succeeds or fails with a [`RiotApiError`].
pub type RiotApiResponse<T> = Result<T, RiotApiError>;

// ============================================================================
// Summoner-v4
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    /// Encrypted summoner id, the external id of a roster entry.
    pub id: String,
    pub name: String,
}

// ============================================================================
// League-v4
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl LeagueEntryDto {
    /// `Ok(None)` for queues the leaderboard does not rank.
    pub fn into_rank_entry(self) -> RiotApiResponse<Option<RankEntry>> {
        let Some(queue) = QueueType::from_api(&self.queue_type) else {
            return Ok(None);
        };

        let tier: Tier = self.tier.parse().map_err(RiotApiError::Malformed)?;
        let division = if tier.is_apex() {
            None
        } else {
            Some(self.rank.parse::<Division>().map_err(RiotApiError::Malformed)?)
        };

        Ok(Some(RankEntry {
            queue,
            tier,
            division,
            league_points: self.league_points,
            wins: self.wins,
            losses: self.losses,
        }))
    }
}
