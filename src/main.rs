use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use config::Config;
use db::Repository;
use discord::{Data, create_framework};
use error::AppError;
use ranking::RankingAggregator;
use riot::RiotClient;
use roster::RosterManager;

mod config;
mod db;
mod discord;
mod error;
mod logging;
mod ranking;
mod riot;
mod roster;
#[cfg(test)]
mod testing;
mod traits;

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!(error = %e, "❌ Fatal error, shutting down");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    info!("🐙 Starting...");

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    let repository = Arc::new(Repository::new(pool));

    let riot = Arc::new(RiotClient::new(
        config.riot_api_key.clone(),
        config.riot_timeout,
    )?);

    let concurrency = config.leaderboard_concurrency.get();
    let data = Data {
        db: repository.clone(),
        roster: RosterManager::new(repository.clone(), riot.clone(), concurrency),
        ranking: RankingAggregator::new(repository, riot, concurrency),
        default_region: config.default_region,
        default_prefix: config.default_prefix.clone(),
    };

    // Prefix commands need the message content.
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(create_framework(data))
        .await?;

    info!("🌐 Connecting to Discord gateway");
    client.start().await?;

    Ok(())
}
