use poise::serenity_prelude::Role;
use tracing::{info, warn};

use super::{arguments::TrimmedString, guild_id, user_err, CommandResult, Context};
use crate::settings::RoleRef;

/// Set the role given to members after they submit the form.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
#[tracing::instrument(skip(ctx), fields(guild_id))]
pub async fn setrole(
    ctx: Context<'_>,

    #[description = "The role to give."] role: Option<Role>,

    #[description = "Or the name of the role to give, matched ignoring case."]
    name: Option<TrimmedString>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    tracing::Span::current().record("guild_id", guild_id.get());

    let role_ref = match (role, name.and_then(TrimmedString::non_empty)) {
        (Some(role), None) => RoleRef::ById(role.id),
        (None, Some(name)) => RoleRef::ByName(name),
        (Some(_), Some(_)) => {
            return Err(user_err(
                "Please pick either a role or a role name, not both.",
            ))
        }
        (None, None) => return Err(user_err("Please pick a role or type a role name.")),
    };

    let mut reply = format!("✅ Members who submit the form will get {role_ref}.");

    if let RoleRef::ByName(_) = &role_ref {
        match ctx.data().granter.resolve_role(guild_id, &role_ref).await {
            Ok(Some(_)) => {}
            Ok(None) => reply.push_str("\n⚠️ There is no role with that name right now."),
            Err(err) => warn!("Could not check the role name: {err:#}"),
        }
    }

    ctx.data()
        .settings
        .update(guild_id, |config| {
            config.role_to_grant = Some(role_ref);
            Ok(())
        })
        .await?;
    info!("Role to grant configured");

    ctx.say(reply).await?;
    Ok(())
}
