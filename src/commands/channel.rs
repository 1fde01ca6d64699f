use poise::serenity_prelude::{GuildChannel, Mentionable};
use tracing::info;

use super::{guild_id, CommandResult, Context};

/// Set the channel that receives form summaries.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx, channel), fields(guild_id, channel_id = %channel.id))]
pub async fn setchannel(
    ctx: Context<'_>,

    #[description = "The channel to post form summaries in."]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    ctx.data()
        .settings
        .update(guild_id, |config| {
            config.summary_channel = Some(channel.id);
            Ok(())
        })
        .await?;
    info!("Summary channel configured");

    ctx.say(format!("✅ Form summaries will be posted in {}", channel.mention()))
        .await?;
    Ok(())
}
