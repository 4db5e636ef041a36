use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::region::Region;
use super::types::{RiotApiError, RiotApiResponse};
use crate::error::AppError;
use crate::ranking::RankEntry;
use crate::traits::RankingClient;

pub struct RiotClient {
    client: reqwest::Client,
    /// Riot API Key
    key: String,
    /// Replaces the per-platform host, used to point the client at a local server.
    base_url: Option<String>,
}

impl Debug for RiotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RiotClient {
    /// Every request is bounded by `timeout`; an elapsed timeout surfaces as a
    /// [`RiotApiError::Reqwest`].
    pub fn new(key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            key,
            base_url: None,
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(super) fn platform_url(&self, region: Region) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => region.base_url(),
        }
    }

    pub(super) async fn get<T: DeserializeOwned + Debug>(&self, url: &str) -> RiotApiResponse<T> {
        tracing::trace!(url, "[RIOT::CLIENT] GET");

        let res = self
            .client
            .get(url)
            .header("X-Riot-Token", &self.key)
            .send()
            .await?;

        match res.status() {
            StatusCode::OK => {
                let body = res.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            status => Err(RiotApiError::Status(status)),
        }
    }
}

#[async_trait]
impl RankingClient for RiotClient {
    async fn resolve_id_by_name(&self, region: Region, display_name: &str) -> RiotApiResponse<String> {
        Ok(self.get_summoner_by_name(region, display_name).await?.id)
    }

    async fn resolve_name_by_id(&self, region: Region, external_id: &str) -> RiotApiResponse<String> {
        Ok(self.get_summoner_by_id(region, external_id).await?.name)
    }

    async fn fetch_rank_entries(
        &self,
        region: Region,
        external_id: &str,
    ) -> RiotApiResponse<Vec<RankEntry>> {
        let entries = self
            .get_league_entries_by_summoner(region, external_id)
            .await?;

        let mut ranks = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(rank) = entry.into_rank_entry()? {
                ranks.push(rank);
            }
        }
        Ok(ranks)
    }
}
