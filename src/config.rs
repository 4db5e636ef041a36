use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::AppError;
use crate::riot::Region;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub riot_api_key: String,
    pub database_url: String,
    pub riot_timeout: Duration,
    pub leaderboard_concurrency: NonZeroUsize,
    pub default_region: Region,
    pub default_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_RIOT_TIMEOUT_SECS: u64 = 10;
        const DEFAULT_LEADERBOARD_CONCURRENCY: usize = 4;
        const DEFAULT_PREFIX: &str = "$";

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        let riot_api_key = env::var("RIOT_API_KEY")
            .map_err(|_| AppError::Config("RIOT_API_KEY must be set".into()))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ladder.db".into());

        let riot_timeout = env::var("RIOT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_RIOT_TIMEOUT_SECS));

        let leaderboard_concurrency = env::var("LEADERBOARD_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(|| {
                NonZeroUsize::new(DEFAULT_LEADERBOARD_CONCURRENCY).unwrap_or(NonZeroUsize::MIN)
            });

        let default_region = match env::var("DEFAULT_REGION") {
            Ok(code) => code.parse()?,
            Err(_) => Region::EUN1,
        };

        let default_prefix = env::var("DEFAULT_PREFIX")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.into());

        Ok(Self {
            discord_token,
            riot_api_key,
            database_url,
            riot_timeout,
            leaderboard_concurrency,
            default_region,
            default_prefix,
        })
    }
}
