use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use super::bot::Data;
use crate::error::AppError;

/// Keeps `community_config` in line with the servers the bot is a member of.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, AppError>,
    data: &Data,
) -> Result<(), AppError> {
    match event {
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            info!(
                user = %data_about_bot.user.name,
                guild_count = data_about_bot.guilds.len(),
                "🤖 Connected to gateway"
            );
            ctx.set_activity(Some(serenity::ActivityData::watching("the ranked ladder")));
        }
        // Also fired for every server at startup; registration keeps an
        // existing configuration.
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            let community = data
                .db
                .register_community(
                    &guild.id.to_string(),
                    data.default_region,
                    &data.default_prefix,
                )
                .await?;

            if matches!(is_new, Some(true)) {
                info!(
                    guild_id = %guild.id,
                    guild_name = %guild.name,
                    region = %community.region,
                    "🤖 Joined a new server"
                );
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            if incomplete.unavailable {
                debug!(guild_id = %incomplete.id, "🤖 Server unavailable, keeping its data");
                return Ok(());
            }

            let existed = data
                .db
                .deregister_community(&incomplete.id.to_string())
                .await?;
            data.roster
                .forget_community(&incomplete.id.to_string())
                .await;
            info!(guild_id = %incomplete.id, existed, "🤖 Left server, data removed");
        }
        _ => {}
    }

    Ok(())
}
