use indoc::formatdoc;
use tracing::info;

use super::{arguments::TrimmedString, guild_id, CommandResult, Context};

/// Link this server to the id your web form sends as `server_id`.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn setserverid(
    ctx: Context<'_>,

    #[description = "The id the form sends. Leave blank to unlink."] id: Option<TrimmedString>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let external_id = id.and_then(TrimmedString::non_empty);
    ctx.data()
        .settings
        .link_external_id(guild_id, external_id.clone())
        .await?;
    info!("Linked server id: {external_id:?}");

    let reply = match external_id {
        Some(external_id) => {
            format!("✅ Submissions with `server_id` `{external_id}` will go to this server.")
        }
        None => "✅ Unlinked the server id.".to_string(),
    };

    ctx.say(reply).await?;
    Ok(())
}

/// Show the ids your web form can use to reach this server.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn serverid(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let config = ctx.data().settings.get(guild_id).await;
    let linked = config
        .linked_external_id
        .map(|id| format!("`{id}`"))
        .unwrap_or_else(|| "none".to_string());

    ctx.say(formatdoc! {
        r#"
            **Guild id:** `{guild_id}` (send it as `guild_id`)
            **Linked server id:** {linked} (send it as `server_id`)
        "#,
        guild_id = guild_id,
        linked = linked,
    })
    .await?;
    Ok(())
}
