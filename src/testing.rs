//! In-process ladder service used by the roster and ranking tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::ranking::{Division, QueueType, RankEntry, Tier};
use crate::riot::{Region, RiotApiError, RiotApiResponse};
use crate::traits::RankingClient;

#[derive(Default)]
struct LadderState {
    /// external id -> current name
    accounts: HashMap<String, String>,
    ranks: HashMap<String, Vec<RankEntry>>,
    failing_ranks: HashSet<String>,
    rank_delays: HashMap<String, Duration>,
    offline: bool,
}

#[derive(Default)]
pub struct FakeLadder {
    state: Mutex<LadderState>,
}

impl FakeLadder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: &str, name: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(id.to_string(), name.to_string());
        self
    }

    /// Renames the account; the old name becomes free.
    pub fn rename(&self, id: &str, new_name: &str) -> &Self {
        self.account(id, new_name)
    }

    pub fn delete(&self, id: &str) -> &Self {
        self.state.lock().unwrap().accounts.remove(id);
        self
    }

    pub fn rank(&self, id: &str, rank: RankEntry) -> &Self {
        self.state
            .lock()
            .unwrap()
            .ranks
            .entry(id.to_string())
            .or_default()
            .push(rank);
        self
    }

    pub fn fail_ranks_for(&self, id: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .failing_ranks
            .insert(id.to_string());
        self
    }

    /// Rank lookups for `id` answer only after `delay`.
    pub fn delay_ranks_for(&self, id: &str, delay: Duration) -> &Self {
        self.state
            .lock()
            .unwrap()
            .rank_delays
            .insert(id.to_string(), delay);
        self
    }

    pub fn set_offline(&self, offline: bool) -> &Self {
        self.state.lock().unwrap().offline = offline;
        self
    }
}

fn unavailable() -> RiotApiError {
    RiotApiError::Status(StatusCode::SERVICE_UNAVAILABLE)
}

fn not_found() -> RiotApiError {
    RiotApiError::Status(StatusCode::NOT_FOUND)
}

#[async_trait]
impl RankingClient for FakeLadder {
    async fn resolve_id_by_name(
        &self,
        _region: Region,
        display_name: &str,
    ) -> RiotApiResponse<String> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(unavailable());
        }
        let wanted = display_name.to_lowercase();
        state
            .accounts
            .iter()
            .find(|(_, name)| name.to_lowercase() == wanted)
            .map(|(id, _)| id.clone())
            .ok_or_else(not_found)
    }

    async fn resolve_name_by_id(
        &self,
        _region: Region,
        external_id: &str,
    ) -> RiotApiResponse<String> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(unavailable());
        }
        state.accounts.get(external_id).cloned().ok_or_else(not_found)
    }

    async fn fetch_rank_entries(
        &self,
        _region: Region,
        external_id: &str,
    ) -> RiotApiResponse<Vec<RankEntry>> {
        let delay = self.state.lock().unwrap().rank_delays.get(external_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.offline || state.failing_ranks.contains(external_id) {
            return Err(unavailable());
        }
        Ok(state.ranks.get(external_id).cloned().unwrap_or_default())
    }
}

pub fn solo(tier: Tier, division: Option<Division>, league_points: u32) -> RankEntry {
    RankEntry {
        queue: QueueType::Solo,
        tier,
        division,
        league_points,
        wins: 10,
        losses: 5,
    }
}

pub fn flex(tier: Tier, division: Option<Division>, league_points: u32) -> RankEntry {
    RankEntry {
        queue: QueueType::Flex,
        ..solo(tier, division, league_points)
    }
}
