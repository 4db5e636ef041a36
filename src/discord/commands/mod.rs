mod config;
mod help;
mod ping;
mod ranking;
mod roster;

pub use config::{prefix, region, showregion};
pub use help::help;
pub use ping::ping;
pub use ranking::ranking;
pub use roster::{add, del, delall, showall};

use crate::discord::bot::{Context, Data};
use crate::error::AppError;

/// Every command registered with the framework.
pub fn all() -> Vec<poise::Command<Data, AppError>> {
    vec![
        help(),
        region(),
        showregion(),
        prefix(),
        add(),
        del(),
        delall(),
        showall(),
        ranking(),
        ping(),
    ]
}

/// Rosters and configuration are keyed by the server id.
fn community_id(ctx: &Context<'_>) -> Result<String, AppError> {
    ctx.guild_id()
        .map(|id| id.to_string())
        .ok_or(AppError::NotInGuild)
}
