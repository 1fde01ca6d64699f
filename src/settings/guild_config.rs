use std::fmt::Display;

use poise::serenity_prelude::{ChannelId, RoleId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBED_COLOR: &str = "#FFD700";

/// Maximum length of a summary template, in characters.
pub const MAX_SUMMARY_TEMPLATE_CHARS: usize = 100;

/// The role handed out after a form submission.
///
/// Written as `{"id": ...}` or `{"name": ...}`. A bare role id is read as
/// [`RoleRef::ById`], which is how older settings files store it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRoleRef")]
pub enum RoleRef {
    #[serde(rename = "id")]
    ById(RoleId),
    /// Matched case-insensitively against the guild's role names.
    #[serde(rename = "name")]
    ByName(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRoleRef {
    Bare(RoleId),
    Tagged(TaggedRoleRef),
}

#[derive(Deserialize)]
enum TaggedRoleRef {
    #[serde(rename = "id")]
    ById(RoleId),
    #[serde(rename = "name")]
    ByName(String),
}

impl From<StoredRoleRef> for RoleRef {
    fn from(stored: StoredRoleRef) -> Self {
        match stored {
            StoredRoleRef::Bare(id) | StoredRoleRef::Tagged(TaggedRoleRef::ById(id)) => {
                RoleRef::ById(id)
            }
            StoredRoleRef::Tagged(TaggedRoleRef::ByName(name)) => RoleRef::ByName(name),
        }
    }
}

impl Display for RoleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleRef::ById(id) => write!(f, "<@&{id}>"),
            RoleRef::ByName(name) => write!(f, "`{name}`"),
        }
    }
}

/// Per-guild bot settings, as persisted in the settings file.
///
/// Every field is independently optional. A freshly created record is equal
/// to `GuildConfig::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    #[serde(rename = "summaryChannel")]
    pub summary_channel: Option<ChannelId>,
    #[serde(rename = "announceChannel")]
    pub announce_channel: Option<ChannelId>,
    #[serde(rename = "announceMessage")]
    pub announce_message: Option<String>,
    #[serde(rename = "summaryMessage")]
    pub summary_template: Option<String>,
    #[serde(rename = "roleToGive")]
    pub role_to_grant: Option<RoleRef>,
    #[serde(rename = "embedImage")]
    pub embed_image_url: Option<String>,
    #[serde(rename = "embedColor")]
    pub embed_color: String,
    /// External key that form submissions may send as `server_id`.
    #[serde(rename = "linkedServerId")]
    pub linked_external_id: Option<String>,
}

impl Default for GuildConfig {
    fn default() -> Self {
        GuildConfig {
            summary_channel: None,
            announce_channel: None,
            announce_message: None,
            summary_template: None,
            role_to_grant: None,
            embed_image_url: None,
            embed_color: DEFAULT_EMBED_COLOR.to_string(),
            linked_external_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use poise::serenity_prelude::{ChannelId, RoleId};

    use super::*;

    #[test_log::test]
    fn default_record_has_gold_color_and_nothing_else() {
        let config = GuildConfig::default();

        assert_eq!(config.embed_color, "#FFD700");
        assert_eq!(config.summary_channel, None);
        assert_eq!(config.summary_template, None);
        assert_eq!(config.role_to_grant, None);
    }

    #[test_log::test]
    fn reads_legacy_record_with_missing_keys() {
        let json = indoc! {r##"
            {
              "summaryChannel": "1100000000000000001",
              "announceChannel": null,
              "summaryMessage": "{OC} / {IC}",
              "embedColor": "#00FF00"
            }
        "##};

        let config: GuildConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.summary_channel,
            Some(ChannelId::new(1100000000000000001))
        );
        assert_eq!(config.summary_template.as_deref(), Some("{OC} / {IC}"));
        assert_eq!(config.embed_color, "#00FF00");
        assert_eq!(config.linked_external_id, None);
    }

    #[test_log::test]
    fn role_reference_is_tagged() {
        let by_id = serde_json::to_value(RoleRef::ById(RoleId::new(42))).unwrap();
        let by_name = serde_json::to_value(RoleRef::ByName("Member".into())).unwrap();

        assert!(by_id.get("id").is_some());
        assert_eq!(by_name, serde_json::json!({ "name": "Member" }));
    }

    #[test_log::test]
    fn tagged_role_reference_reads_back() {
        let by_id = serde_json::to_string(&RoleRef::ById(RoleId::new(42))).unwrap();
        let by_name = serde_json::to_string(&RoleRef::ByName("Member".into())).unwrap();

        assert_eq!(
            serde_json::from_str::<RoleRef>(&by_id).unwrap(),
            RoleRef::ById(RoleId::new(42))
        );
        assert_eq!(
            serde_json::from_str::<RoleRef>(&by_name).unwrap(),
            RoleRef::ByName("Member".into())
        );
    }

    #[test_log::test]
    fn reads_bare_role_id_from_older_files() {
        let json = indoc! {r##"
            {
              "summaryChannel": null,
              "announceChannel": null,
              "announceMessage": null,
              "summaryMessage": null,
              "roleToGive": "999",
              "embedImage": null,
              "embedColor": "#FFD700"
            }
        "##};

        let config: GuildConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.role_to_grant, Some(RoleRef::ById(RoleId::new(999))));
        assert_eq!(config.embed_image_url, None);
    }
}
