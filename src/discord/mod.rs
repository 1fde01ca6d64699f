mod serenity_gateway;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};

use crate::summary::Card;

pub use serenity_gateway::SerenityGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRole {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMember {
    pub user_id: UserId,
    /// Username, global display name, nickname and tag, whichever exist.
    pub names: Vec<String>,
    pub roles: Vec<RoleId>,
}

impl GuildMember {
    /// Case-insensitive match against any of the member's names.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names
            .iter()
            .any(|candidate| candidate.to_lowercase() == name)
    }
}

/// Every Discord call the bot makes outside of slash command replies.
///
/// Lookups of things that don't exist return `Ok(None)`/`Ok(false)`;
/// `Err` is reserved for failed requests.
#[async_trait]
pub trait GuildGateway: Send + Sync {
    async fn channel_exists(&self, channel_id: ChannelId) -> anyhow::Result<bool>;

    async fn send_card(&self, channel_id: ChannelId, card: &Card) -> anyhow::Result<()>;

    async fn roles(&self, guild_id: GuildId) -> anyhow::Result<Vec<GuildRole>>;

    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> anyhow::Result<Option<GuildMember>>;

    /// Fetches at most `limit` members whose names start with `query`.
    async fn search_members(
        &self,
        guild_id: GuildId,
        query: &str,
        limit: u64,
    ) -> anyhow::Result<Vec<GuildMember>>;

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
        -> anyhow::Result<()>;
}
