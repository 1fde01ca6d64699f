use poise::serenity_prelude::{GuildChannel, Mentionable};
use tracing::{info, warn};

use super::{arguments::TrimmedString, guild_id, user_err, CommandError, CommandResult, Context};
use crate::{
    settings::DEFAULT_EMBED_COLOR,
    summary::{parse_color, Card},
};

/// Set the form announcement and post it right away.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip_all, fields(guild_id, channel_id = %channel.id))]
pub async fn setannounce(
    ctx: Context<'_>,

    #[description = "The channel to post the announcement in."]
    #[channel_types("Text")]
    channel: GuildChannel,

    #[description = "The announcement text."] message: TrimmedString,

    #[description = "Link to an image or GIF shown in the announcement and summaries."]
    image: Option<TrimmedString>,

    #[description = "Embed color, e.g. #FFD700."] color: Option<TrimmedString>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let message = announcement_text(message)?;

    let config = ctx
        .data()
        .settings
        .update(guild_id, |config| {
            config.announce_channel = Some(channel.id);
            config.announce_message = Some(message);
            config.embed_image_url = image.and_then(TrimmedString::non_empty);
            config.embed_color = color
                .and_then(TrimmedString::non_empty)
                .unwrap_or_else(|| DEFAULT_EMBED_COLOR.to_string());
            Ok(())
        })
        .await?;
    info!("Announcement configured");

    let mut reply = format!("✅ Announcement set up in {}.", channel.mention());

    if parse_color(&config.embed_color).is_none() {
        reply.push_str(&format!(
            "\n⚠️ `{}` is not a `#RRGGBB` color, embeds will use {DEFAULT_EMBED_COLOR}.",
            config.embed_color
        ));
    }

    if let Some(card) = Card::announcement(&config) {
        if let Err(err) = ctx.data().gateway.send_card(channel.id, &card).await {
            warn!("Could not post the announcement: {err:#}");
            reply.push_str(
                "\n⚠️ Could not post the announcement in that channel. Please check the bot's permissions there.",
            );
        }
    }

    ctx.say(reply).await?;
    Ok(())
}

fn announcement_text(message: TrimmedString) -> Result<String, CommandError> {
    message
        .non_empty()
        .ok_or_else(|| user_err("The announcement text can't be empty."))
}
