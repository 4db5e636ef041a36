//! Roster membership per community, deduplicated on the ladder's external id.

use std::collections::HashMap;
use std::sync::Arc;

use futures::{StreamExt, stream};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::db::RosterEntry;
use crate::error::AppError;
use crate::traits::{IdentityStore, RankingClient};

mod reconciler;

pub use reconciler::IdentityReconciler;
use reconciler::DriftOutcome;

/// Display names are matched case-insensitively; external ids never are.
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub struct RosterManager<S, C> {
    store: Arc<S>,
    client: Arc<C>,
    concurrency: usize,
    /// Serializes the check-then-insert sequence of `add` per community.
    community_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S, C> RosterManager<S, C>
where
    S: IdentityStore,
    C: RankingClient,
{
    pub fn new(store: Arc<S>, client: Arc<C>, concurrency: usize) -> Self {
        Self {
            store,
            client,
            concurrency: concurrency.max(1),
            community_locks: Mutex::new(HashMap::new()),
        }
    }

    fn reconciler(&self) -> IdentityReconciler<'_, S, C> {
        IdentityReconciler::new(self.store.as_ref(), self.client.as_ref())
    }

    async fn community_lock(&self, community_id: &str) -> Arc<Mutex<()>> {
        self.community_locks
            .lock()
            .await
            .entry(community_id.to_string())
            .or_default()
            .clone()
    }

    /// Tracks `display_name` in the community's region.
    #[instrument(skip(self))]
    pub async fn add(&self, community_id: &str, display_name: &str) -> Result<RosterEntry, AppError> {
        let display_name = display_name.trim();
        let region = self.store.community_config(community_id).await?.region;

        let external_id = self
            .client
            .resolve_id_by_name(region, display_name)
            .await
            .map_err(|source| AppError::InvalidPlayer {
                display_name: display_name.to_string(),
                source,
            })?;

        let lock = self.community_lock(community_id).await;
        let _guard = lock.lock().await;

        let mut roster: Vec<RosterEntry> = self
            .store
            .list_roster(community_id)
            .await?
            .into_iter()
            .filter(|entry| entry.region == region)
            .collect();

        // Heal rows stored under this name before comparing ids. A row whose
        // account renamed away keeps its id. Only a row whose account no longer
        // exists is re-pointed at the current owner of the name.
        let reconciler = self.reconciler();
        for entry in roster
            .iter_mut()
            .filter(|entry| same_name(&entry.display_name, display_name))
        {
            let outcome = reconciler.check_name_drift(entry).await;
            if matches!(
                &outcome,
                DriftOutcome::Unavailable(AppError::LookupFailure(e)) if e.is_not_found()
            ) {
                reconciler.check_id_drift(entry).await;
            }
        }

        let collisions = roster
            .iter()
            .filter(|entry| entry.external_id == external_id)
            .count();

        match collisions {
            0 => {}
            1 => return Err(AppError::AlreadyTracked(display_name.to_string())),
            n => {
                error!(
                    community_id,
                    external_id = %external_id,
                    count = n,
                    "🧾 ❌ Account tracked more than once"
                );
                return Err(AppError::Inconsistent(format!(
                    "{display_name} is tracked {n} times in {community_id}"
                )));
            }
        }

        let entry = RosterEntry {
            display_name: display_name.to_string(),
            external_id,
            community_id: community_id.to_string(),
            region,
        };
        self.store.insert_roster_entry(&entry).await?;

        info!(region = %region, "🧾 Player added to roster");
        Ok(entry)
    }

    /// Removes the first entry whose name matches, case-insensitively, in the
    /// community's current region.
    #[instrument(skip(self))]
    pub async fn remove(&self, community_id: &str, display_name: &str) -> Result<RosterEntry, AppError> {
        let display_name = display_name.trim();
        let region = self.store.community_config(community_id).await?.region;

        let entry = self
            .store
            .list_roster(community_id)
            .await?
            .into_iter()
            .find(|entry| entry.region == region && same_name(&entry.display_name, display_name))
            .ok_or_else(|| AppError::PlayerNotTracked(display_name.to_string()))?;

        self.store
            .remove_roster_entry(community_id, region, &entry.display_name)
            .await?;

        info!(removed = %entry.display_name, "🧾 Player removed from roster");
        Ok(entry)
    }

    /// Drops the add lock of a community that left.
    pub async fn forget_community(&self, community_id: &str) {
        self.community_locks.lock().await.remove(community_id);
    }

    /// Returns how many entries were removed.
    #[instrument(skip(self))]
    pub async fn remove_all(&self, community_id: &str) -> Result<u64, AppError> {
        let removed = self.store.remove_all_roster_entries(community_id).await?;
        info!(removed, "🧾 Roster cleared");
        Ok(removed)
    }

    /// Full roster with names refreshed from the ladder where it answers.
    #[instrument(skip(self))]
    pub async fn list(&self, community_id: &str) -> Result<Vec<RosterEntry>, AppError> {
        let roster = self.store.list_roster(community_id).await?;
        let reconciler = self.reconciler();
        let reconciler = &reconciler;

        let refreshed = stream::iter(roster)
            .map(|mut entry| async move {
                reconciler.check_name_drift(&mut entry).await;
                entry
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(refreshed)
    }
}
