use sqlx::FromRow;

use crate::riot::Region;

/// One tracked chat server with its ladder region.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Community {
    pub community_id: String,
    #[sqlx(try_from = "String")]
    pub region: Region,
    pub prefix: String,
}

/// One tracked account within a community.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RosterEntry {
    pub display_name: String,
    /// Encrypted summoner id assigned by Riot.
    pub external_id: String,
    pub community_id: String,
    /// Copied from the community when the entry was added.
    #[sqlx(try_from = "String")]
    pub region: Region,
}
