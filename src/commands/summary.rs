use std::collections::HashMap;

use indoc::formatdoc;
use poise::CreateReply;
use tracing::info;

use super::{arguments::TrimmedString, guild_id, CommandResult, Context};
use crate::{
    settings::MAX_SUMMARY_TEMPLATE_CHARS,
    summary::{render, Card, PlaceholderCase},
};

/// Set the summary template, e.g. `{OC} {IC} {A} {IC_A} {HCM} {SPC} {DC} {STR}`.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn setsummary(
    ctx: Context<'_>,

    #[description = "Summary template. Each {FIELD} becomes a field of the summary."]
    message: TrimmedString,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let template: String = message.into();
    let placeholders = render(&template, &HashMap::new(), PlaceholderCase::Lower)
        .into_iter()
        .map(|field| format!("`{}`", field.label))
        .collect::<Vec<_>>();

    ctx.data()
        .settings
        .set_summary_template(guild_id, template)
        .await?;
    info!("Summary template configured");

    let reply = if placeholders.is_empty() {
        formatdoc! {
            r#"
                ✅ Saved the summary template.

                It has no `{{FIELD}}` placeholders, so summaries will have no fields.
            "#
        }
    } else {
        formatdoc! {
            r#"
                ✅ Saved the summary template.

                Summaries will show: {fields}
                Use `/preview` to see how it looks. Templates can be up to {limit} characters long.
            "#,
            fields = placeholders.join(", "),
            limit = MAX_SUMMARY_TEMPLATE_CHARS,
        }
    };

    ctx.say(reply).await?;
    Ok(())
}

/// Preview the announcement and the summary with sample answers.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn preview(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let config = ctx.data().settings.get(guild_id).await;

    ctx.send(
        CreateReply::default()
            .embed(Card::announcement_preview(&config).to_embed())
            .ephemeral(true),
    )
    .await?;

    if let Some(card) = Card::summary_preview(&config) {
        ctx.send(CreateReply::default().embed(card.to_embed()).ephemeral(true))
            .await?;
    }

    Ok(())
}
