use std::collections::HashMap;

use poise::serenity_prelude::{Colour, CreateEmbed};
use tracing::warn;

use super::{render, PlaceholderCase, SummaryField};
use crate::settings::{GuildConfig, DEFAULT_EMBED_COLOR};

/// Discord rejects embeds with more fields than this.
pub const MAX_EMBED_FIELDS: usize = 25;
const MAX_FIELD_VALUE_CHARS: usize = 1024;

const DEFAULT_COLOR: u32 = 0xFFD700;
const DEFAULT_ANNOUNCEMENT: &str = "Fill in the form to register your character.";

/// Sample answers used to preview the summary template.
const PREVIEW_DATA: &[(&str, &str)] = &[
    ("OC", "Luna"),
    ("IC", "Shiki"),
    ("A", "17"),
    ("IC_A", "25"),
    ("HCM", "175cm"),
    ("SPC", "Furry Fox"),
    ("DC", "Shiki#1234"),
    ("STR", "Adventurer"),
];

/// A platform-independent embed: what gets posted, not how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<SummaryField>,
    pub image_url: Option<String>,
}

impl Card {
    fn styled(title: &str, config: &GuildConfig) -> Card {
        Card {
            title: title.to_string(),
            description: None,
            color: embed_color(&config.embed_color),
            fields: Vec::new(),
            image_url: config
                .embed_image_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        }
    }

    /// The card posted to the summary channel for a form submission.
    pub fn submission(config: &GuildConfig, answers: &HashMap<String, String>) -> Card {
        let template = config.summary_template.as_deref().unwrap_or_default();
        let mut card = Card::styled("📝 New submission", config);
        card.set_fields(render(template, answers, PlaceholderCase::Lower));
        card
    }

    /// The public announcement, if the guild has an announcement message.
    pub fn announcement(config: &GuildConfig) -> Option<Card> {
        let message = config.announce_message.as_ref()?;
        let mut card = Card::styled("📢 Form announcement", config);
        card.description = Some(message.clone());
        Some(card)
    }

    pub fn announcement_preview(config: &GuildConfig) -> Card {
        let mut card = Card::styled("📢 Announcement preview", config);
        card.description = Some(
            config
                .announce_message
                .clone()
                .unwrap_or_else(|| DEFAULT_ANNOUNCEMENT.to_string()),
        );
        card
    }

    /// The summary template rendered against sample answers, if a template is set.
    pub fn summary_preview(config: &GuildConfig) -> Option<Card> {
        let template = config.summary_template.as_deref()?;
        let preview_data: HashMap<String, String> = PREVIEW_DATA
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let mut card = Card::styled("📝 Summary preview", config);
        card.image_url = None;
        card.set_fields(render(template, &preview_data, PlaceholderCase::Upper));
        Some(card)
    }

    fn set_fields(&mut self, mut fields: Vec<SummaryField>) {
        if fields.len() > MAX_EMBED_FIELDS {
            warn!(
                "Summary has {} fields, only the first {MAX_EMBED_FIELDS} are shown",
                fields.len()
            );
            fields.truncate(MAX_EMBED_FIELDS);
        }

        for field in fields.iter_mut() {
            if field.value.chars().count() > MAX_FIELD_VALUE_CHARS {
                field.value = field.value.chars().take(MAX_FIELD_VALUE_CHARS).collect();
            }
        }

        self.fields = fields;
    }

    pub fn to_embed(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .title(&self.title)
            .colour(Colour::new(self.color));

        if let Some(description) = &self.description {
            embed = embed.description(description);
        }

        for field in &self.fields {
            embed = embed.field(&field.label, &field.value, true);
        }

        if let Some(image_url) = &self.image_url {
            embed = embed.image(image_url);
        }

        embed
    }
}

/// Parses `#RRGGBB` or `RRGGBB`.
pub fn parse_color(color: &str) -> Option<u32> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn embed_color(color: &str) -> u32 {
    parse_color(color).unwrap_or_else(|| {
        warn!("Invalid embed color `{color}`, using {DEFAULT_EMBED_COLOR}");
        DEFAULT_COLOR
    })
}

#[cfg(test)]
mod tests {
    use map_macro::hash_map;

    use super::*;
    use crate::summary::template::NOT_SPECIFIED;

    fn config_with_template(template: &str) -> GuildConfig {
        GuildConfig {
            summary_template: Some(template.to_string()),
            ..Default::default()
        }
    }

    #[test_log::test]
    fn colors() {
        assert_eq!(parse_color("#FFD700"), Some(0xFFD700));
        assert_eq!(parse_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_color(" #123abc "), Some(0x123ABC));
        assert_eq!(parse_color("gold"), None);
        assert_eq!(parse_color("#FFF"), None);
        assert_eq!(parse_color("#+12345"), None);
    }

    #[test_log::test]
    fn invalid_color_falls_back_to_gold() {
        let config = GuildConfig {
            embed_color: "purple".into(),
            announce_message: Some("Hi".into()),
            ..Default::default()
        };

        let card = Card::announcement(&config).unwrap();

        assert_eq!(card.color, 0xFFD700);
    }

    #[test_log::test]
    fn submission_uses_lower_case_answers() {
        let config = GuildConfig {
            embed_image_url: Some("https://example.com/banner.gif".into()),
            ..config_with_template("{OC} ({A})")
        };
        let answers = hash_map! {
            "oc".to_string() => "Luna".to_string(),
        };

        let card = Card::submission(&config, &answers);

        assert_eq!(
            card.fields,
            vec![
                SummaryField::new("OC", "Luna"),
                SummaryField::new("A", NOT_SPECIFIED)
            ]
        );
        assert_eq!(
            card.image_url.as_deref(),
            Some("https://example.com/banner.gif")
        );
    }

    #[test_log::test]
    fn submission_without_template_has_no_fields() {
        let card = Card::submission(&GuildConfig::default(), &HashMap::new());

        assert!(card.fields.is_empty());
    }

    #[test_log::test]
    fn too_many_fields_are_cut() {
        let config = config_with_template(&"{A}".repeat(30));

        let card = Card::submission(&config, &HashMap::new());

        assert_eq!(card.fields.len(), MAX_EMBED_FIELDS);
    }

    #[test_log::test]
    fn long_values_are_cut() {
        let config = config_with_template("{OC}");
        let answers = hash_map! {
            "oc".to_string() => "x".repeat(2000),
        };

        let card = Card::submission(&config, &answers);

        assert_eq!(card.fields[0].value.len(), 1024);
    }

    #[test_log::test]
    fn summary_preview_uses_sample_answers() {
        let config = config_with_template("{oc} {DC} {UNKNOWN}");

        let card = Card::summary_preview(&config).unwrap();

        assert_eq!(
            card.fields,
            vec![
                SummaryField::new("oc", "Luna"),
                SummaryField::new("DC", "Shiki#1234"),
                SummaryField::new("UNKNOWN", NOT_SPECIFIED),
            ]
        );
    }

    #[test_log::test]
    fn previews_without_settings() {
        let config = GuildConfig::default();

        assert!(Card::summary_preview(&config).is_none());
        assert!(Card::announcement(&config).is_none());
        assert_eq!(
            Card::announcement_preview(&config).description.as_deref(),
            Some(DEFAULT_ANNOUNCEMENT)
        );
    }
}
