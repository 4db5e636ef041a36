use tracing::{info, instrument};

use super::community_id;
use crate::discord::bot::Context;
use crate::error::AppError;
use crate::riot::Region;
use crate::traits::IdentityStore;

const MAX_PREFIX_LEN: usize = 5;

fn validate_prefix(prefix: &str) -> Result<&str, AppError> {
    let trimmed = prefix.trim();
    let len = trimmed.chars().count();

    if len == 0 || len > MAX_PREFIX_LEN || trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidPrefix(prefix.to_string()));
    }
    Ok(trimmed)
}

/// Change the ladder region used for new players and rankings
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    aliases("changeregion")
)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn region(
    ctx: Context<'_>,
    #[description = "Region code, e.g. EUW, EUNE, NA, KR"] code: String,
) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    let region: Region = code.parse()?;
    ctx.data().db.set_region(&community_id, region).await?;

    ctx.say(format!("Region changed to {}", region.display_name()))
        .await?;

    info!(region = %region, "Region configured");

    Ok(())
}

/// Show the region currently used by this server
#[poise::command(prefix_command, slash_command, guild_only, aliases("showreg"))]
pub async fn showregion(ctx: Context<'_>) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    let community = ctx.data().db.community_config(&community_id).await?;

    ctx.say(format!(
        "Currently set region: {} ({})",
        community.region.display_name(),
        community.region
    ))
    .await?;

    Ok(())
}

/// Change the prefix of text commands in this server
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn prefix(
    ctx: Context<'_>,
    #[description = "New prefix, up to 5 characters"] new_prefix: String,
) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    let new_prefix = validate_prefix(&new_prefix)?;
    ctx.data().db.set_prefix(&community_id, new_prefix).await?;

    ctx.say(format!("Prefix changed to: '{new_prefix}'")).await?;

    info!(prefix = new_prefix, "Prefix configured");

    Ok(())
}
