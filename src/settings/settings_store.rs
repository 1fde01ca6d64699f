use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use poise::serenity_prelude::GuildId;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{GuildConfig, MAX_SUMMARY_TEMPLATE_CHARS};

type GuildConfigs = BTreeMap<GuildId, GuildConfig>;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Could not write settings to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("The summary template is {length} characters long, but the limit is {limit}")]
    TemplateTooLong { length: usize, limit: usize },
    #[error("Server id `{external_id}` is already linked to another server ({guild_id})")]
    ExternalIdTaken {
        external_id: String,
        guild_id: GuildId,
    },
}

/// Per-guild settings backed by a single JSON file.
///
/// Every mutation rewrites the whole file from this instance's in-memory
/// state. Mutations through one instance are serialized; two instances over
/// the same file overwrite each other and the last full write wins.
pub struct SettingsStore {
    path: PathBuf,
    guilds: Mutex<GuildConfigs>,
}

impl SettingsStore {
    /// Loads the settings file, treating a missing or malformed file as empty.
    ///
    /// A malformed file is moved to `<path>.bak` so the next write doesn't
    /// destroy it.
    #[tracing::instrument]
    pub async fn load(path: PathBuf) -> SettingsStore {
        let guilds = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<GuildConfigs>(&contents) {
                Ok(guilds) => {
                    info!("Loaded settings for {} guild(s)", guilds.len());
                    guilds
                }
                Err(err) => {
                    warn!("Settings file is malformed, starting with empty settings: {err}");
                    let backup = backup_path(&path);
                    match tokio::fs::rename(&path, &backup).await {
                        Ok(()) => warn!("Moved the malformed settings file to {}", backup.display()),
                        Err(err) => warn!("Could not back up the malformed settings file: {err}"),
                    }
                    GuildConfigs::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No settings file yet, starting with empty settings");
                GuildConfigs::new()
            }
            Err(err) => {
                warn!("Could not read settings file, starting with empty settings: {err}");
                GuildConfigs::new()
            }
        };

        SettingsStore {
            path,
            guilds: Mutex::new(guilds),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the guild's record, or a default one that is not persisted.
    pub async fn get(&self, guild_id: GuildId) -> GuildConfig {
        self.guilds
            .lock()
            .await
            .get(&guild_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn contains(&self, guild_id: GuildId) -> bool {
        self.guilds.lock().await.contains_key(&guild_id)
    }

    /// Finds the guild whose record is linked to `external_id`.
    pub async fn find_by_external_id(&self, external_id: &str) -> Option<(GuildId, GuildConfig)> {
        self.guilds
            .lock()
            .await
            .iter()
            .find(|(_, config)| config.linked_external_id.as_deref() == Some(external_id))
            .map(|(guild_id, config)| (*guild_id, config.clone()))
    }

    /// Applies `mutator` to the guild's record and persists every record.
    ///
    /// The record is created if it doesn't exist yet. If the mutator fails or
    /// the file cannot be written, the in-memory state stays unchanged.
    pub async fn update<F>(&self, guild_id: GuildId, mutator: F) -> Result<GuildConfig, SettingsError>
    where
        F: FnOnce(&mut GuildConfig) -> Result<(), SettingsError>,
    {
        let mut guilds = self.guilds.lock().await;

        let mut updated = guilds.clone();
        let config = updated.entry(guild_id).or_default();
        mutator(config)?;
        let config = config.clone();

        self.persist(&updated).await?;
        *guilds = updated;

        debug!("Updated settings for guild {guild_id}: {config:?}");
        Ok(config)
    }

    /// Stores the summary template, rejecting templates over the length cap.
    pub async fn set_summary_template(
        &self,
        guild_id: GuildId,
        template: String,
    ) -> Result<GuildConfig, SettingsError> {
        let length = template.chars().count();
        if length > MAX_SUMMARY_TEMPLATE_CHARS {
            return Err(SettingsError::TemplateTooLong {
                length,
                limit: MAX_SUMMARY_TEMPLATE_CHARS,
            });
        }

        self.update(guild_id, |config| {
            config.summary_template = Some(template);
            Ok(())
        })
        .await
    }

    /// Links the guild to an external id, or unlinks it when `external_id` is `None`.
    ///
    /// An external id can be linked to at most one guild.
    pub async fn link_external_id(
        &self,
        guild_id: GuildId,
        external_id: Option<String>,
    ) -> Result<GuildConfig, SettingsError> {
        let mut guilds = self.guilds.lock().await;

        if let Some(external_id) = &external_id {
            let taken_by = guilds.iter().find(|(other, config)| {
                **other != guild_id && config.linked_external_id.as_ref() == Some(external_id)
            });
            if let Some((other, _)) = taken_by {
                return Err(SettingsError::ExternalIdTaken {
                    external_id: external_id.clone(),
                    guild_id: *other,
                });
            }
        }

        let mut updated = guilds.clone();
        let config = updated.entry(guild_id).or_default();
        config.linked_external_id = external_id;
        let config = config.clone();

        self.persist(&updated).await?;
        *guilds = updated;

        Ok(config)
    }

    /// Resets the guild's record to defaults and persists every record.
    pub async fn clear(&self, guild_id: GuildId) -> Result<GuildConfig, SettingsError> {
        self.update(guild_id, |config| {
            *config = GuildConfig::default();
            Ok(())
        })
        .await
    }

    async fn persist(&self, guilds: &GuildConfigs) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(guilds)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    PathBuf::from(backup)
}
