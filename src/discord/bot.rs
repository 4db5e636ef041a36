use std::sync::Arc;

use tracing::{error, info, warn};

use crate::db::Repository;
use crate::error::AppError;
use crate::ranking::RankingAggregator;
use crate::riot::{Region, RiotClient};
use crate::roster::RosterManager;

use super::commands;
use super::handler::event_handler;

/// Shared data accessible in all commands
pub struct Data {
    pub db: Arc<Repository>,
    pub roster: RosterManager<Repository, RiotClient>,
    pub ranking: RankingAggregator<Repository, RiotClient>,
    /// Region given to a server when the bot joins it.
    pub default_region: Region,
    pub default_prefix: String,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("db", &self.db)
            .field("roster", &"<RosterManager>")
            .field("ranking", &"<RankingAggregator>")
            .field("default_region", &self.default_region)
            .field("default_prefix", &self.default_prefix)
            .finish()
    }
}

pub type Context<'a> = poise::Context<'a, Data, AppError>;

pub fn create_framework(data: Data) -> poise::Framework<Data, AppError> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                dynamic_prefix: Some(|ctx| Box::pin(dynamic_prefix(ctx))),
                mention_as_prefix: true,
                case_insensitive_commands: true,
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    handle_error(error).await;
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(
                    bot_name = %ready.user.name,
                    guild_count = ready.guilds.len(),
                    "🎮 Bot is ready"
                );
                Ok(data)
            })
        })
        .build()
}

/// The server's stored prefix, or the default one outside servers and for
/// servers that have not been registered yet.
async fn dynamic_prefix(
    ctx: poise::PartialContext<'_, Data, AppError>,
) -> Result<Option<String>, AppError> {
    let Some(guild_id) = ctx.guild_id else {
        return Ok(Some(ctx.data.default_prefix.clone()));
    };

    let prefix = ctx
        .data
        .db
        .get_community(&guild_id.to_string())
        .await?
        .map(|community| community.prefix)
        .unwrap_or_else(|| ctx.data.default_prefix.clone());

    Ok(Some(prefix))
}

async fn handle_error(error: poise::FrameworkError<'_, Data, AppError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command_name = ctx.command().name.as_str();
            if error.is_user_facing() {
                warn!(
                    error = %error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ⚠️ Command rejected"
                );
            } else {
                error!(
                    error = ?error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ❌ Command execution failed"
                );
            }
            let _ = ctx.say(format!("Error: {}", error)).await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!(
                error = %error,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Invalid command argument"
            );
            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            warn!(
                permissions = %missing_permissions,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Bot missing permissions"
            );
            let _ = ctx
                .say(format!("Missing permissions: {}", missing_permissions))
                .await;
        }
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            if let Some(perms) = missing_permissions {
                warn!(
                    permissions = %perms,
                    user_id = %ctx.author().id,
                    command = ctx.command().name.as_str(),
                    "🎮 ⚠️ User missing permissions"
                );
                let _ = ctx
                    .say(format!("You need these permissions: {}", perms))
                    .await;
            }
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            let _ = ctx.say(AppError::NotInGuild.to_string()).await;
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            error!(error = ?error, "🎮 ❌ Event handler failed");
        }
        other => {
            error!(error = ?other, "🎮 ❌ Unhandled framework error");
        }
    }
}
