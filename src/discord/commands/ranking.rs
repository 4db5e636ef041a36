use poise::serenity_prelude as serenity;
use tracing::instrument;

use super::community_id;
use crate::discord::bot::Context;
use crate::error::AppError;
use crate::ranking::{Leaderboard, QueueType};

/// Show this server's ranking for a queue
#[poise::command(prefix_command, slash_command, guild_only)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn ranking(
    ctx: Context<'_>,
    #[description = "solo or flex"] queue: String,
) -> Result<(), AppError> {
    let community_id = community_id(&ctx)?;
    tracing::Span::current().record("guild_id", community_id.as_str());

    let queue: QueueType = queue.parse()?;

    // One or more lookups per player
    ctx.defer().await?;

    let leaderboard = ctx
        .data()
        .ranking
        .compute_leaderboard(&community_id, queue)
        .await?;

    if leaderboard.is_empty() {
        let message = match leaderboard.skipped.first() {
            Some(account) => format!("Could not fetch ranks right now: {}", account.error),
            None => "There are no players placed in the ranking".to_string(),
        };
        ctx.say(message).await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Ranked {}", leaderboard.queue.label()))
        .description(leaderboard_text(&leaderboard))
        .color(0x0080ff);

    if let Some(footer) = skipped_footer(&leaderboard) {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn medal(position: usize) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

fn leaderboard_text(leaderboard: &Leaderboard) -> String {
    leaderboard
        .rows
        .iter()
        .map(|row| match medal(row.position) {
            Some(medal) => format!("{}. {medal} {row}", row.position),
            None => format!("{}. {row}", row.position),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn skipped_footer(leaderboard: &Leaderboard) -> Option<String> {
    if leaderboard.skipped.is_empty() {
        return None;
    }

    let names: Vec<&str> = leaderboard
        .skipped
        .iter()
        .map(|account| account.display_name.as_str())
        .collect();
    Some(format!("Ranks unavailable for: {}", names.join(", ")))
}
