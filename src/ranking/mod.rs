//! Ranked standings and the per-community leaderboard.
//!
//! [`RankEntry`] is one queue result fetched from the ladder service,
//! [`LeaderboardRow`] is a tracked account joined with that result. Both only
//! live for the duration of a single leaderboard request.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::db::RosterEntry;
use crate::error::AppError;

mod aggregator;

pub use aggregator::{Leaderboard, RankingAggregator, SkippedAccount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    /// Ranked Solo/Duo
    Solo,
    /// Ranked Flex
    Flex,
}

impl QueueType {
    /// League-v4 `queueType` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "RANKED_SOLO_5x5",
            Self::Flex => "RANKED_FLEX_SR",
        }
    }

    /// Returns `None` for queues that have no standing on the leaderboard.
    pub fn from_api(queue_type: &str) -> Option<Self> {
        [Self::Solo, Self::Flex]
            .into_iter()
            .find(|queue| queue.as_str() == queue_type)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Solo => "Solo",
            Self::Flex => "Flex",
        }
    }
}

impl FromStr for QueueType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solo" => Ok(Self::Solo),
            "flex" => Ok(Self::Flex),
            _ => Err(AppError::InvalidQueue(s.to_string())),
        }
    }
}

/// Declared best first; [`Tier::position`] follows this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Challenger,
    Grandmaster,
    Master,
    Diamond,
    Emerald,
    Platinum,
    Gold,
    Silver,
    Bronze,
    Iron,
}

impl Tier {
    /// 0 for Challenger, growing towards Iron.
    pub fn position(&self) -> u8 {
        *self as u8
    }

    /// Apex tiers have a single ladder and no divisions.
    pub fn is_apex(&self) -> bool {
        matches!(self, Self::Challenger | Self::Grandmaster | Self::Master)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Challenger => "CHALLENGER",
            Self::Grandmaster => "GRANDMASTER",
            Self::Master => "MASTER",
            Self::Diamond => "DIAMOND",
            Self::Emerald => "EMERALD",
            Self::Platinum => "PLATINUM",
            Self::Gold => "GOLD",
            Self::Silver => "SILVER",
            Self::Bronze => "BRONZE",
            Self::Iron => "IRON",
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHALLENGER" => Ok(Self::Challenger),
            "GRANDMASTER" => Ok(Self::Grandmaster),
            "MASTER" => Ok(Self::Master),
            "DIAMOND" => Ok(Self::Diamond),
            "EMERALD" => Ok(Self::Emerald),
            "PLATINUM" => Ok(Self::Platinum),
            "GOLD" => Ok(Self::Gold),
            "SILVER" => Ok(Self::Silver),
            "BRONZE" => Ok(Self::Bronze),
            "IRON" => Ok(Self::Iron),
            other => Err(format!("unknown tier {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
        }
    }
}

impl FromStr for Division {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::I),
            "II" => Ok(Self::II),
            "III" => Ok(Self::III),
            "IV" => Ok(Self::IV),
            other => Err(format!("unknown division {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub queue: QueueType,
    pub tier: Tier,
    /// Always `None` for apex tiers.
    pub division: Option<Division>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
}

impl RankEntry {
    /// Division as compared by the leaderboard: the roman numeral string.
    fn division_key(&self) -> &'static str {
        self.division.map(|d| d.as_str()).unwrap_or("")
    }

    pub fn win_ratio(&self) -> u32 {
        win_ratio(self.wins, self.losses)
    }
}

impl fmt::Display for RankEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.division {
            Some(division) => write!(
                f,
                "{} {} {} LP",
                self.tier.as_str(),
                division.as_str(),
                self.league_points
            ),
            None => write!(f, "{} {} LP", self.tier.as_str(), self.league_points),
        }
    }
}

/// Win percentage rounded to the nearest integer, ties to even. 0 when no games were played.
pub fn win_ratio(wins: u32, losses: u32) -> u32 {
    let games = u64::from(wins) + u64::from(losses);
    if games == 0 {
        return 0;
    }
    let ratio = (u64::from(wins) * 100) as f64 / games as f64;
    ratio.round_ties_even() as u32
}

/// Leaderboard order: tier best first, then division by its roman numeral string
/// ascending, then league points descending.
pub fn compare_standing(a: &RankEntry, b: &RankEntry) -> Ordering {
    a.tier
        .position()
        .cmp(&b.tier.position())
        .then_with(|| a.division_key().cmp(b.division_key()))
        .then_with(|| b.league_points.cmp(&a.league_points))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based.
    pub position: usize,
    pub entry: RosterEntry,
    pub rank: RankEntry,
    pub win_ratio: u32,
}

impl fmt::Display for LeaderboardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} **{}** - {}W {}L / Win Ratio {}%",
            self.entry.display_name, self.rank, self.rank.wins, self.rank.losses, self.win_ratio
        )
    }
}

/// Sorts ranked accounts and assigns positions. The sort is stable, so accounts
/// with identical standings keep their input order.
pub fn rank_rows(mut ranked: Vec<(RosterEntry, RankEntry)>) -> Vec<LeaderboardRow> {
    ranked.sort_by(|(_, a), (_, b)| compare_standing(a, b));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (entry, rank))| LeaderboardRow {
            position: i + 1,
            win_ratio: rank.win_ratio(),
            entry,
            rank,
        })
        .collect()
}
