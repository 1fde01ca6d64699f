use std::collections::HashMap;

use poise::serenity_prelude::{GuildId, UserId};
use serde_json::Value;

use super::ApiError;
use crate::roles::UserRef;

/// A form submission, flattened to lower-case keys and string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    fields: HashMap<String, String>,
}

impl SubmissionPayload {
    /// Accepts a JSON object. Scalars become strings, arrays of scalars are
    /// joined with `, `, nulls and nested objects are dropped.
    pub fn from_json(body: Value) -> Result<SubmissionPayload, ApiError> {
        let Value::Object(object) = body else {
            return Err(ApiError::BadRequest(
                "The submission must be a JSON object".to_string(),
            ));
        };

        let fields = object
            .into_iter()
            .filter_map(|(key, value)| Some((key.to_lowercase(), field_value(value)?)))
            .collect();

        Ok(SubmissionPayload { fields })
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// The trimmed value of `key`, if present and not blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.get("guild_id").and_then(parse_snowflake).map(GuildId::new)
    }

    /// The external server id, matched against linked server ids.
    pub fn server_id(&self) -> Option<&str> {
        self.get("server_id")
    }

    /// The submitter, preferring `discord_id` over `discord_user`.
    pub fn user(&self) -> Option<UserRef> {
        if let Some(id) = self.get("discord_id").and_then(parse_snowflake) {
            return Some(UserRef::ById(UserId::new(id)));
        }
        self.get("discord_user")
            .map(|name| UserRef::ByName(name.to_string()))
    }
}

pub fn parse_snowflake(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|id| *id != 0)
}

fn field_value(value: Value) -> Option<String> {
    match value {
        Value::String(string) => Some(string),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(|item| !item.is_array())
                .filter_map(field_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Null | Value::Object(_) => None,
    }
}
