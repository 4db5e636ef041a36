use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{Span, debug, info, instrument, warn};

use super::{LeaderboardRow, QueueType, RankEntry, rank_rows};
use crate::db::RosterEntry;
use crate::error::AppError;
use crate::roster::IdentityReconciler;
use crate::traits::{IdentityStore, RankingClient};

/// An account left off the leaderboard because its ranks could not be fetched.
#[derive(Debug)]
pub struct SkippedAccount {
    pub display_name: String,
    pub error: AppError,
}

#[derive(Debug)]
pub struct Leaderboard {
    pub queue: QueueType,
    /// Sorted, positions starting at 1.
    pub rows: Vec<LeaderboardRow>,
    pub skipped: Vec<SkippedAccount>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

enum Standing {
    Ranked(RosterEntry, RankEntry),
    Unranked,
    Failed(SkippedAccount),
}

pub struct RankingAggregator<S, C> {
    store: Arc<S>,
    client: Arc<C>,
    concurrency: usize,
}

impl<S, C> RankingAggregator<S, C>
where
    S: IdentityStore,
    C: RankingClient,
{
    pub fn new(store: Arc<S>, client: Arc<C>, concurrency: usize) -> Self {
        Self {
            store,
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Builds the community's leaderboard for `queue`.
    ///
    /// Accounts without a standing in the queue are left out, and so are accounts
    /// whose ranks could not be fetched; the latter are listed in
    /// [`Leaderboard::skipped`]. Only a missing community or a store failure fails
    /// the whole call.
    #[instrument(skip(self), fields(roster_size))]
    pub async fn compute_leaderboard(
        &self,
        community_id: &str,
        queue: QueueType,
    ) -> Result<Leaderboard, AppError> {
        let region = self.store.community_config(community_id).await?.region;

        let roster: Vec<RosterEntry> = self
            .store
            .list_roster(community_id)
            .await?
            .into_iter()
            .filter(|entry| entry.region == region)
            .collect();

        Span::current().record("roster_size", roster.len());

        // `buffered` yields in roster order whatever the completion order is.
        let standings: Vec<Standing> = stream::iter(roster)
            .map(|entry| self.standing_of(entry, queue))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut ranked = Vec::new();
        let mut skipped = Vec::new();
        for standing in standings {
            match standing {
                Standing::Ranked(entry, rank) => ranked.push((entry, rank)),
                Standing::Unranked => {}
                Standing::Failed(account) => skipped.push(account),
            }
        }

        let rows = rank_rows(ranked);

        info!(
            queue = queue.label(),
            rows = rows.len(),
            skipped = skipped.len(),
            "🏆 Leaderboard computed"
        );

        Ok(Leaderboard {
            queue,
            rows,
            skipped,
        })
    }

    async fn standing_of(&self, mut entry: RosterEntry, queue: QueueType) -> Standing {
        IdentityReconciler::new(self.store.as_ref(), self.client.as_ref())
            .converge(&mut entry)
            .await;

        let ranks = match self
            .client
            .fetch_rank_entries(entry.region, &entry.external_id)
            .await
        {
            Ok(ranks) => ranks,
            Err(e) => {
                warn!(
                    error = %e,
                    display_name = %entry.display_name,
                    "🏆 ⚠️ Could not fetch ranks, leaving account off the leaderboard"
                );
                return Standing::Failed(SkippedAccount {
                    display_name: entry.display_name,
                    error: e.into(),
                });
            }
        };

        match ranks.into_iter().find(|rank| rank.queue == queue) {
            Some(rank) => Standing::Ranked(entry, rank),
            None => {
                debug!(
                    display_name = %entry.display_name,
                    queue = queue.label(),
                    "🏆 No standing in queue"
                );
                Standing::Unranked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::{Repository, test_repository};
    use crate::ranking::{Division, Tier};
    use crate::riot::Region;
    use crate::testing::{FakeLadder, flex, solo};

    const GUILD: &str = "guild-1";

    async fn setup() -> (
        Arc<Repository>,
        Arc<FakeLadder>,
        RankingAggregator<Repository, FakeLadder>,
    ) {
        let repo = Arc::new(test_repository().await);
        repo.register_community(GUILD, Region::EUN1, "$")
            .await
            .unwrap();
        let ladder = Arc::new(FakeLadder::new());
        let aggregator = RankingAggregator::new(repo.clone(), ladder.clone(), 3);
        (repo, ladder, aggregator)
    }

    async fn track(repo: &Repository, ladder: &FakeLadder, name: &str, id: &str) {
        ladder.account(id, name);
        repo.insert_roster_entry(&RosterEntry {
            display_name: name.to_string(),
            external_id: id.to_string(),
            community_id: GUILD.to_string(),
            region: Region::EUN1,
        })
        .await
        .unwrap();
    }

    fn names(board: &Leaderboard) -> Vec<&str> {
        board
            .rows
            .iter()
            .map(|row| row.entry.display_name.as_str())
            .collect()
    }

    #[tokio::test]
    async fn sorts_by_tier_division_then_points() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "A", "id-a").await;
        track(&repo, &ladder, "B", "id-b").await;
        track(&repo, &ladder, "C", "id-c").await;
        ladder
            .rank("id-a", solo(Tier::Gold, Some(Division::II), 40))
            .rank("id-b", solo(Tier::Gold, Some(Division::I), 10))
            .rank("id-c", solo(Tier::Platinum, Some(Division::IV), 0));

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&board), ["C", "B", "A"]);
        assert_eq!(
            board.rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert!(board.skipped.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_drops_only_that_account() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "first", "id-1").await;
        track(&repo, &ladder, "second", "id-2").await;
        track(&repo, &ladder, "third", "id-3").await;
        ladder
            .rank("id-1", solo(Tier::Diamond, Some(Division::I), 10))
            .rank("id-2", solo(Tier::Challenger, None, 900))
            .rank("id-3", solo(Tier::Iron, Some(Division::IV), 0))
            .fail_ranks_for("id-2");

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&board), ["first", "third"]);
        assert_eq!(board.skipped.len(), 1);
        assert_eq!(board.skipped[0].display_name, "second");
        assert!(matches!(board.skipped[0].error, AppError::LookupFailure(_)));
    }

    #[tokio::test]
    async fn ties_keep_roster_order_when_later_fetches_finish_first() {
        let (repo, ladder, _) = setup().await;
        let aggregator = RankingAggregator::new(repo.clone(), ladder.clone(), 5);
        for n in 1..=5u64 {
            let name = n.to_string();
            let id = format!("id-{n}");
            track(&repo, &ladder, &name, &id).await;
            ladder
                .rank(&id, solo(Tier::Gold, Some(Division::III), 50))
                .delay_ranks_for(&id, Duration::from_millis(60 - n * 10));
        }

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&board), ["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn queue_filter_leaves_out_unranked_accounts() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "solo-only", "id-1").await;
        track(&repo, &ladder, "both", "id-2").await;
        track(&repo, &ladder, "unranked", "id-3").await;
        ladder
            .rank("id-1", solo(Tier::Master, None, 120))
            .rank("id-2", solo(Tier::Bronze, Some(Division::III), 5))
            .rank("id-2", flex(Tier::Silver, Some(Division::I), 77));

        let flex_board = aggregator
            .compute_leaderboard(GUILD, QueueType::Flex)
            .await
            .unwrap();
        let solo_board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&flex_board), ["both"]);
        assert_eq!(flex_board.rows[0].rank.league_points, 77);
        assert!(flex_board.skipped.is_empty());
        assert_eq!(names(&solo_board), ["solo-only", "both"]);
    }

    #[tokio::test]
    async fn empty_roster_is_an_empty_leaderboard() {
        let (_, _, aggregator) = setup().await;

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert!(board.is_empty());
        assert!(board.skipped.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_community_fails() {
        let (_, _, aggregator) = setup().await;

        let res = aggregator
            .compute_leaderboard("other-guild", QueueType::Flex)
            .await;

        assert!(matches!(res, Err(AppError::CommunityNotConfigured(_))));
    }

    #[tokio::test]
    async fn renamed_account_shows_under_its_new_name() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "Kayn", "id-1").await;
        ladder
            .rename("id-1", "Rhaast")
            .rank("id-1", solo(Tier::Emerald, Some(Division::II), 61));

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&board), ["Rhaast"]);
        assert_eq!(
            repo.list_roster(GUILD).await.unwrap()[0].display_name,
            "Rhaast"
        );
    }

    #[tokio::test]
    async fn only_the_community_region_is_ranked() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "home", "id-1").await;
        repo.insert_roster_entry(&RosterEntry {
            display_name: "away".to_string(),
            external_id: "id-2".to_string(),
            community_id: GUILD.to_string(),
            region: Region::NA1,
        })
        .await
        .unwrap();
        ladder
            .account("id-2", "away")
            .rank("id-1", solo(Tier::Gold, Some(Division::IV), 0))
            .rank("id-2", solo(Tier::Challenger, None, 1500));

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(names(&board), ["home"]);
    }

    #[tokio::test]
    async fn zero_games_have_zero_win_ratio() {
        let (repo, ladder, aggregator) = setup().await;
        track(&repo, &ladder, "fresh", "id-1").await;
        let mut rank = solo(Tier::Iron, Some(Division::IV), 0);
        rank.wins = 0;
        rank.losses = 0;
        ladder.rank("id-1", rank);

        let board = aggregator
            .compute_leaderboard(GUILD, QueueType::Solo)
            .await
            .unwrap();

        assert_eq!(board.rows[0].win_ratio, 0);
    }
}
