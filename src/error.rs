use thiserror::Error;

use crate::riot::RiotApiError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Riot API lookup failed: {0}")]
    LookupFailure(#[from] RiotApiError),

    #[error("Discord error: {0}")]
    Discord(Box<serenity::Error>),

    #[error("Could not add {display_name}: invalid name or region")]
    InvalidPlayer {
        display_name: String,
        #[source]
        source: RiotApiError,
    },

    #[error("This server is not configured yet ({0})")]
    CommunityNotConfigured(String),

    #[error("Player {0} is not tracked in this server")]
    PlayerNotTracked(String),

    #[error("Player {0} is already added to the ranking")]
    AlreadyTracked(String),

    #[error("Roster invariant violated: {0}")]
    Inconsistent(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid queue: {0} (expected solo or flex)")]
    InvalidQueue(String),

    #[error("Invalid prefix {0:?}: it must be 1 to 5 characters without spaces")]
    InvalidPrefix(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("This command can only be used inside a server")]
    NotInGuild,
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}

impl AppError {
    /// Errors caused by what the user asked for rather than by the bot.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidPlayer { .. }
                | Self::CommunityNotConfigured(_)
                | Self::PlayerNotTracked(_)
                | Self::AlreadyTracked(_)
                | Self::InvalidRegion(_)
                | Self::InvalidQueue(_)
                | Self::InvalidPrefix(_)
                | Self::NotInGuild
        )
    }
}
