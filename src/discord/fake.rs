use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};

use super::{GuildGateway, GuildMember, GuildRole};
use crate::summary::Card;

/// In-memory guild that records every call with side effects.
#[derive(Default)]
pub struct FakeGateway {
    pub channels: Vec<ChannelId>,
    pub roles: Vec<GuildRole>,
    pub members: Vec<GuildMember>,
    pub fail_sends: bool,
    pub fail_role_lookups: bool,
    pub sent: Mutex<Vec<(ChannelId, Card)>>,
    pub granted: Mutex<Vec<(UserId, RoleId)>>,
    pub searches: Mutex<Vec<(String, u64)>>,
}

impl FakeGateway {
    pub fn role(mut self, id: u64, name: &str) -> Self {
        self.roles.push(GuildRole {
            id: RoleId::new(id),
            name: name.to_string(),
        });
        self
    }

    pub fn member(mut self, id: u64, name: &str, roles: &[u64]) -> Self {
        self.members.push(GuildMember {
            user_id: UserId::new(id),
            names: vec![name.to_string()],
            roles: roles.iter().map(|r| RoleId::new(*r)).collect(),
        });
        self
    }

    pub fn channel(mut self, id: u64) -> Self {
        self.channels.push(ChannelId::new(id));
        self
    }

    pub fn sent(&self) -> Vec<(ChannelId, Card)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn granted(&self) -> Vec<(UserId, RoleId)> {
        self.granted.lock().unwrap().clone()
    }
}

#[async_trait]
impl GuildGateway for FakeGateway {
    async fn channel_exists(&self, channel_id: ChannelId) -> anyhow::Result<bool> {
        Ok(self.channels.contains(&channel_id))
    }

    async fn send_card(&self, channel_id: ChannelId, card: &Card) -> anyhow::Result<()> {
        if self.fail_sends {
            return Err(anyhow!("Missing Permissions"));
        }
        self.sent.lock().unwrap().push((channel_id, card.clone()));
        Ok(())
    }

    async fn roles(&self, _guild_id: GuildId) -> anyhow::Result<Vec<GuildRole>> {
        if self.fail_role_lookups {
            return Err(anyhow!("Gateway timeout"));
        }
        Ok(self.roles.clone())
    }

    async fn member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> anyhow::Result<Option<GuildMember>> {
        Ok(self.members.iter().find(|m| m.user_id == user_id).cloned())
    }

    async fn search_members(
        &self,
        _guild_id: GuildId,
        query: &str,
        limit: u64,
    ) -> anyhow::Result<Vec<GuildMember>> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));

        let query = query.to_lowercase();
        Ok(self
            .members
            .iter()
            .filter(|m| m.names.iter().any(|n| n.to_lowercase().starts_with(&query)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn add_role(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> anyhow::Result<()> {
        self.granted.lock().unwrap().push((user_id, role_id));
        Ok(())
    }
}
