use tracing::info;

use super::{guild_id, CommandResult, Context};

/// Reset all form settings of this server.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn clearsetting(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    ctx.data().settings.clear(guild_id).await?;
    info!("Settings cleared");

    ctx.say("🧹 Cleared the settings of this server.").await?;
    Ok(())
}
