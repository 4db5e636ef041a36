//! Keeps a stored roster identity in line with what the ladder service reports.
//!
//! Both checks are best-effort: when the service or the store cannot be reached
//! the stored values stay as they are and the outcome says so. A later call heals
//! the entry.

use tracing::{debug, info, warn};

use crate::db::RosterEntry;
use crate::error::AppError;
use crate::traits::{IdentityStore, RankingClient};

#[derive(Debug)]
pub enum DriftOutcome {
    InSync,
    /// The entry was rewritten; holds the value it replaced.
    Repaired { previous: String },
    /// Nothing changed because a lookup or write failed.
    Unavailable(AppError),
}

impl DriftOutcome {
    #[cfg(test)]
    pub fn is_in_sync(&self) -> bool {
        matches!(self, Self::InSync)
    }
}

/// Tally of one [`IdentityReconciler::converge`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Convergence {
    pub repaired: usize,
    pub unavailable: usize,
}

impl Convergence {
    fn record(&mut self, outcome: &DriftOutcome) {
        match outcome {
            DriftOutcome::InSync => {}
            DriftOutcome::Repaired { .. } => self.repaired += 1,
            DriftOutcome::Unavailable(_) => self.unavailable += 1,
        }
    }
}

pub struct IdentityReconciler<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    client: &'a C,
}

impl<'a, S, C> IdentityReconciler<'a, S, C>
where
    S: IdentityStore + ?Sized,
    C: RankingClient + ?Sized,
{
    pub fn new(store: &'a S, client: &'a C) -> Self {
        Self { store, client }
    }

    /// Follows an account rename: the stored name becomes whatever the service
    /// currently calls the stored external id.
    pub async fn check_name_drift(&self, entry: &mut RosterEntry) -> DriftOutcome {
        let current = match self
            .client
            .resolve_name_by_id(entry.region, &entry.external_id)
            .await
        {
            Ok(name) => name,
            Err(e) => {
                warn!(
                    error = %e,
                    display_name = %entry.display_name,
                    "🔁 ⚠️ Could not refresh display name, keeping stored value"
                );
                return DriftOutcome::Unavailable(e.into());
            }
        };

        if current == entry.display_name {
            return DriftOutcome::InSync;
        }

        if let Err(e) = self.store.update_display_name(entry, &current).await {
            warn!(
                error = %e,
                display_name = %entry.display_name,
                new_name = %current,
                "🔁 ⚠️ Could not store refreshed display name"
            );
            return DriftOutcome::Unavailable(e);
        }

        info!(
            old_name = %entry.display_name,
            new_name = %current,
            community_id = %entry.community_id,
            "🔁 Display name healed"
        );
        let previous = std::mem::replace(&mut entry.display_name, current);
        DriftOutcome::Repaired { previous }
    }

    /// Follows a moved name: the stored external id becomes whichever account the
    /// service currently associates with the stored name.
    pub async fn check_id_drift(&self, entry: &mut RosterEntry) -> DriftOutcome {
        let current = match self
            .client
            .resolve_id_by_name(entry.region, &entry.display_name)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    error = %e,
                    display_name = %entry.display_name,
                    "🔁 ⚠️ Could not refresh external id, keeping stored value"
                );
                return DriftOutcome::Unavailable(e.into());
            }
        };

        if current == entry.external_id {
            return DriftOutcome::InSync;
        }

        if let Err(e) = self.store.update_external_id(entry, &current).await {
            warn!(
                error = %e,
                display_name = %entry.display_name,
                "🔁 ⚠️ Could not store refreshed external id"
            );
            return DriftOutcome::Unavailable(e);
        }

        info!(
            display_name = %entry.display_name,
            community_id = %entry.community_id,
            "🔁 External id healed"
        );
        let previous = std::mem::replace(&mut entry.external_id, current);
        DriftOutcome::Repaired { previous }
    }

    /// Id-drift, name-drift, then id-drift again, since a healed name can point
    /// at a different account than the stale one did.
    pub async fn converge(&self, entry: &mut RosterEntry) -> Convergence {
        let mut convergence = Convergence::default();

        convergence.record(&self.check_id_drift(entry).await);
        convergence.record(&self.check_name_drift(entry).await);
        convergence.record(&self.check_id_drift(entry).await);

        debug!(
            display_name = %entry.display_name,
            repaired = convergence.repaired,
            unavailable = convergence.unavailable,
            "🔁 Identity converged"
        );
        convergence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Repository, test_repository};
    use crate::riot::Region;
    use crate::testing::FakeLadder;

    fn entry(name: &str, id: &str) -> RosterEntry {
        RosterEntry {
            display_name: name.to_string(),
            external_id: id.to_string(),
            community_id: "guild-1".to_string(),
            region: Region::EUN1,
        }
    }

    async fn stored(repo: &Repository) -> Vec<RosterEntry> {
        repo.list_roster("guild-1").await.unwrap()
    }

    #[tokio::test]
    async fn name_drift_follows_a_rename() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Rhaast");
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();

        let outcome = IdentityReconciler::new(&repo, &ladder)
            .check_name_drift(&mut kayn)
            .await;

        assert!(matches!(outcome, DriftOutcome::Repaired { previous } if previous == "Kayn"));
        assert_eq!(kayn, entry("Rhaast", "id-1"));
        assert_eq!(stored(&repo).await, vec![entry("Rhaast", "id-1")]);
    }

    #[tokio::test]
    async fn id_drift_follows_a_reassigned_name() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-2", "Kayn");
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();

        let outcome = IdentityReconciler::new(&repo, &ladder)
            .check_id_drift(&mut kayn)
            .await;

        assert!(matches!(outcome, DriftOutcome::Repaired { previous } if previous == "id-1"));
        assert_eq!(stored(&repo).await, vec![entry("Kayn", "id-2")]);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_stored_values() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Rhaast").set_offline(true);
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();
        let reconciler = IdentityReconciler::new(&repo, &ladder);

        let by_id = reconciler.check_name_drift(&mut kayn).await;
        let by_name = reconciler.check_id_drift(&mut kayn).await;

        assert!(matches!(by_id, DriftOutcome::Unavailable(AppError::LookupFailure(_))));
        assert!(matches!(by_name, DriftOutcome::Unavailable(AppError::LookupFailure(_))));
        assert_eq!(kayn, entry("Kayn", "id-1"));
        assert_eq!(stored(&repo).await, vec![entry("Kayn", "id-1")]);
    }

    #[tokio::test]
    async fn second_pass_is_a_fixed_point() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Rhaast");
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();
        let reconciler = IdentityReconciler::new(&repo, &ladder);

        let first_name = reconciler.check_name_drift(&mut kayn).await;
        let first_id = reconciler.check_id_drift(&mut kayn).await;
        let after_first = stored(&repo).await;

        let second_name = reconciler.check_name_drift(&mut kayn).await;
        let second_id = reconciler.check_id_drift(&mut kayn).await;

        assert!(matches!(first_name, DriftOutcome::Repaired { .. }));
        assert!(first_id.is_in_sync());
        assert!(second_name.is_in_sync());
        assert!(second_id.is_in_sync());
        assert_eq!(stored(&repo).await, after_first);
    }

    #[tokio::test]
    async fn converge_untangles_a_rename_with_a_reused_name() {
        // id-1 was "Kayn" and renamed to "Rhaast", then a new account id-2 took "Kayn".
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Rhaast").account("id-2", "Kayn");
        let mut stale = entry("Kayn", "id-1");
        repo.insert_roster_entry(&stale).await.unwrap();

        let convergence = IdentityReconciler::new(&repo, &ladder)
            .converge(&mut stale)
            .await;

        // Id-drift re-points the row at the new holder of the name, the name
        // check then agrees, the last id check is a no-op.
        assert_eq!(convergence.repaired, 1);
        assert_eq!(convergence.unavailable, 0);
        assert_eq!(stale, entry("Kayn", "id-2"));
    }

    #[tokio::test]
    async fn converge_is_idempotent() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Rhaast");
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();
        let reconciler = IdentityReconciler::new(&repo, &ladder);

        let first = reconciler.converge(&mut kayn).await;
        let second = reconciler.converge(&mut kayn).await;

        assert_eq!(first.unavailable, 1);
        assert_eq!(first.repaired, 1);
        assert_eq!(second, Convergence { repaired: 0, unavailable: 0 });
        assert_eq!(stored(&repo).await, vec![entry("Rhaast", "id-1")]);
    }

    #[tokio::test]
    async fn deleted_account_is_left_untouched() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Kayn").delete("id-1");
        let mut kayn = entry("Kayn", "id-1");
        repo.insert_roster_entry(&kayn).await.unwrap();

        let convergence = IdentityReconciler::new(&repo, &ladder)
            .converge(&mut kayn)
            .await;

        assert_eq!(convergence, Convergence { repaired: 0, unavailable: 3 });
        assert_eq!(stored(&repo).await, vec![entry("Kayn", "id-1")]);
    }

    #[tokio::test]
    async fn conflicting_id_repair_is_a_no_op() {
        let repo = test_repository().await;
        let ladder = FakeLadder::new();
        ladder.account("id-1", "Kayn");
        repo.insert_roster_entry(&entry("Shadow", "id-1")).await.unwrap();
        let mut other = entry("Kayn", "id-2");
        repo.insert_roster_entry(&other).await.unwrap();

        let outcome = IdentityReconciler::new(&repo, &ladder)
            .check_id_drift(&mut other)
            .await;

        assert!(matches!(outcome, DriftOutcome::Unavailable(AppError::AlreadyTracked(_))));
        assert_eq!(other, entry("Kayn", "id-2"));
    }
}
