use crate::discord::bot::Context;
use crate::error::AppError;

/// List the commands, or show details about one of them
#[poise::command(prefix_command, slash_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), AppError> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Commands marked admin need the Administrator permission.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
