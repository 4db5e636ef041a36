use crate::discord::bot::Context;
use crate::error::AppError;

/// Show the gateway latency
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), AppError> {
    let latency = ctx.ping().await;
    ctx.say(format!("{}ms", latency.as_millis())).await?;
    Ok(())
}
