mod announce;
mod arguments;
mod channel;
mod clear;
mod role;
mod server_id;
mod summary;

use poise::serenity_prelude::GuildId;

use crate::{settings::SettingsError, BotState};

type CommandResult = Result<(), CommandError>;
type Context<'a> = poise::Context<'a, BotState, CommandError>;
pub type Command = poise::Command<BotState, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

impl From<SettingsError> for CommandError {
    fn from(error: SettingsError) -> Self {
        match error {
            SettingsError::TemplateTooLong { .. } | SettingsError::ExternalIdTaken { .. } => {
                user_err(error.to_string())
            }
            error => internal_err(format!("Could not save the settings: {error}")),
        }
    }
}

fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

fn guild_id(ctx: Context<'_>) -> Result<GuildId, CommandError> {
    ctx.guild_id()
        .ok_or_else(|| internal_err("This command should be executed only in a guild"))
}

/// Every slash command, including the alternative spellings.
pub fn all() -> Vec<Command> {
    vec![
        channel::setchannel(),
        renamed(channel::setchannel(), "setchanel"),
        announce::setannounce(),
        renamed(announce::setannounce(), "setmessage"),
        summary::setsummary(),
        summary::preview(),
        role::setrole(),
        server_id::setserverid(),
        server_id::serverid(),
        clear::clearsetting(),
        renamed(clear::clearsetting(), "clearconfig"),
    ]
}

fn renamed(mut command: Command, name: &str) -> Command {
    command.name = name.to_string();
    command.qualified_name = name.to_string();
    command
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use poise::serenity_prelude::Permissions;

    use super::*;

    #[test_log::test]
    fn command_names_are_unique() {
        let commands = all();
        let names: HashSet<_> = commands.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names.len(), commands.len());
        for name in [
            "setchannel",
            "setchanel",
            "setannounce",
            "setmessage",
            "setsummary",
            "setrole",
            "setserverid",
            "serverid",
            "preview",
            "clearsetting",
            "clearconfig",
        ] {
            assert!(names.contains(name), "missing /{name}");
        }
    }

    #[test_log::test]
    fn every_command_needs_manage_server() {
        for command in all() {
            assert!(
                command.required_permissions.contains(Permissions::MANAGE_GUILD),
                "/{} is missing required permissions",
                command.name
            );
            assert_eq!(
                command.default_member_permissions,
                Permissions::MANAGE_GUILD,
                "/{} is visible to everyone",
                command.name
            );
        }
    }

    #[test_log::test]
    fn settings_errors_split_into_user_and_internal() {
        let too_long = CommandError::from(SettingsError::TemplateTooLong {
            length: 120,
            limit: 100,
        });
        let write = CommandError::from(SettingsError::Write {
            path: "config.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        assert!(matches!(too_long, CommandError::User { .. }));
        assert!(matches!(write, CommandError::Internal { .. }));
    }
}
