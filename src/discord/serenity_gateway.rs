use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, CreateMessage, GuildId, Member, RoleId, UserId};
use serenity::http::{Http, HttpError};
use tracing::debug;

use super::{GuildGateway, GuildMember, GuildRole};
use crate::summary::Card;

const GRANT_REASON: &str = "Submitted the registration form";

pub struct SerenityGateway {
    http: Arc<Http>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>) -> SerenityGateway {
        SerenityGateway { http }
    }
}

#[async_trait]
impl GuildGateway for SerenityGateway {
    async fn channel_exists(&self, channel_id: ChannelId) -> anyhow::Result<bool> {
        match self.http.get_channel(channel_id).await {
            Ok(_) => Ok(true),
            Err(err) if is_missing(&err) => {
                debug!("Channel {channel_id} is missing or hidden: {err}");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn send_card(&self, channel_id: ChannelId, card: &Card) -> anyhow::Result<()> {
        channel_id
            .send_message(self.http.as_ref(), CreateMessage::new().embed(card.to_embed()))
            .await?;
        Ok(())
    }

    async fn roles(&self, guild_id: GuildId) -> anyhow::Result<Vec<GuildRole>> {
        let roles = self.http.get_guild_roles(guild_id).await?;
        Ok(roles
            .into_iter()
            .map(|role| GuildRole {
                id: role.id,
                name: role.name,
            })
            .collect())
    }

    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> anyhow::Result<Option<GuildMember>> {
        match self.http.get_member(guild_id, user_id).await {
            Ok(member) => Ok(Some(to_guild_member(member))),
            Err(err) if is_missing(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn search_members(
        &self,
        guild_id: GuildId,
        query: &str,
        limit: u64,
    ) -> anyhow::Result<Vec<GuildMember>> {
        let members = self
            .http
            .search_guild_members(guild_id, query, Some(limit))
            .await?;
        Ok(members.into_iter().map(to_guild_member).collect())
    }

    async fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> anyhow::Result<()> {
        self.http
            .add_member_role(guild_id, user_id, role_id, Some(GRANT_REASON))
            .await?;
        Ok(())
    }
}

fn to_guild_member(member: Member) -> GuildMember {
    let mut names = vec![member.user.name.clone(), member.user.tag()];
    names.extend(member.user.global_name.clone());
    names.extend(member.nick.clone());

    GuildMember {
        user_id: member.user.id,
        names,
        roles: member.roles,
    }
}

/// Unknown or inaccessible resources come back as 404 or 403.
fn is_missing(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            matches!(response.status_code.as_u16(), 403 | 404)
        }
        _ => false,
    }
}
