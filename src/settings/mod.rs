mod guild_config;
mod settings_store;

pub use guild_config::{GuildConfig, RoleRef, DEFAULT_EMBED_COLOR, MAX_SUMMARY_TEMPLATE_CHARS};
pub use settings_store::{SettingsError, SettingsStore};
