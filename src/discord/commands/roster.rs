use poise::serenity_prelude as serenity;
use tracing::{info, instrument};

use super::community_id;
use crate::db::RosterEntry;
use crate::discord::bot::Context;
use crate::error::AppError;

/// Add a player to this server's ranking
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    aliases("addplayer")
)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Summoner name"]
    #[rest]
    name: String,
) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    // Defer response since API calls might take a moment
    ctx.defer().await?;

    let entry = ctx.data().roster.add(&community_id, &name).await?;

    ctx.say(format!(
        "Player added to the ranking list: '{}'",
        entry.display_name
    ))
    .await?;

    info!(external_id = %entry.external_id, "Player tracked successfully");

    Ok(())
}

/// Remove a player from this server's ranking
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    aliases("delplayer")
)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn del(
    ctx: Context<'_>,
    #[description = "Summoner name"]
    #[rest]
    name: String,
) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    let entry = ctx.data().roster.remove(&community_id, &name).await?;

    ctx.say(format!(
        "Player '{}' successfully deleted from the ranking list",
        entry.display_name
    ))
    .await?;

    Ok(())
}

/// Remove every player from this server's ranking
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    aliases("delallplayers")
)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn delall(ctx: Context<'_>) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    let removed = ctx.data().roster.remove_all(&community_id).await?;

    ctx.say(format!(
        "Players successfully deleted from the ranking list ({removed} removed)"
    ))
    .await?;

    Ok(())
}

/// List the players tracked in this server
#[poise::command(prefix_command, slash_command, guild_only, aliases("showplayers"))]
pub async fn showall(ctx: Context<'_>) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;

    ctx.defer().await?;

    let players = ctx.data().roster.list(&community_id).await?;

    if players.is_empty() {
        ctx.say("List of players is empty").await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("List of players ({})", players.len()))
        .description(player_lines(&players))
        .color(0x0080ff);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn player_lines(players: &[RosterEntry]) -> String {
    players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            format!(
                "{}. **{}** - Region: **{}**",
                i + 1,
                player.display_name,
                player.region
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
