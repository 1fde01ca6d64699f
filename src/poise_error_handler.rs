use poise::{Context, CreateReply, FrameworkError};
use tracing::{error, warn};

use crate::{commands::CommandError, BotState};

const INTERNAL_ERROR_MESSAGE: &str =
    "Sorry, there was an internal error while executing your command. Please try again later.";

pub async fn handle_error(error: poise::FrameworkError<'_, BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Error in user data setup: {}", error);
        }

        EventHandler { error, event, .. } => {
            error!(
                "Error in user event {} handler: {}",
                event.snake_case_name(),
                error
            );
        }

        Command { error, ctx, .. } => match error {
            CommandError::User { message } => {
                reply_with_error(ctx, &format!("❌ {message}")).await;
            }

            CommandError::Internal { message } => {
                error!(
                    "Internal error in /{}: {}",
                    ctx.command().qualified_name,
                    message
                );
                reply_with_error(ctx, INTERNAL_ERROR_MESSAGE).await;
            }

            CommandError::Serenity(error) => {
                error!(
                    "Serenity error in /{}: {}",
                    ctx.command().qualified_name,
                    error
                );
                reply_with_error(ctx, INTERNAL_ERROR_MESSAGE).await;
            }
        },

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let usage = ctx
                .command()
                .help_text
                .as_deref()
                .unwrap_or("Please check the command options and try again.");

            let response = if let Some(input) = input {
                format!(
                    "**Sorry, cannot parse `{}` as an argument: {}**\n{}",
                    input, error, usage
                )
            } else {
                format!("**{}**\n{}", error, usage)
            };

            reply_with_error(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `{}`: {}",
                ctx.command.qualified_name, description
            );
        }

        MissingBotPermissions { ctx, .. } => {
            reply_with_error(
                ctx,
                "Sorry, the bot lacks permissions necessary to execute this command.",
            )
            .await;
        }

        MissingUserPermissions { ctx, .. } => {
            reply_with_error(
                ctx,
                "Sorry, you need the Manage Server permission to run this command.",
            )
            .await;
        }

        GuildOnly { ctx, .. } => {
            reply_with_error(ctx, "Sorry, but you can only run this command in a server.").await;
        }

        CommandCheckFailed { error, ctx, .. } => {
            let message = if let Some(error) = error {
                format!(
                    "Sorry, can't run this command due to a failed command check: {}",
                    error
                )
            } else {
                "Sorry, can't run this command due to a failed command check.".to_string()
            };

            reply_with_error(ctx, &message).await;
        }

        UnknownInteraction { interaction, .. } => {
            warn!("Received an unknown interaction: {:?}", interaction);
        }

        error => {
            error!("Unknown error: {}", error);
        }
    }
}

async fn reply_with_error(ctx: Context<'_, BotState, CommandError>, error_message: &str) {
    if let Err(send_error) = poise::send_reply(
        ctx,
        CreateReply::default()
            .content(error_message)
            .ephemeral(true),
    )
    .await
    {
        error!(
            "Failed to send an error message to the user: {}\nThe message was: {}",
            send_error, error_message
        );
    }
}
