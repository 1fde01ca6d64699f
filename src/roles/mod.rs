//! Handing out the configured role to whoever submitted the form.

use std::sync::Arc;

use lazy_regex::regex;
use poise::serenity_prelude::{GuildId, RoleId, UserId};
use tracing::{debug, info, warn};

use crate::{
    discord::{GuildGateway, GuildMember},
    settings::RoleRef,
};

/// Discord caps member searches at this many results.
pub const MAX_MEMBER_SEARCH_LIMIT: u64 = 1000;

/// The member a role should be granted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    ById(UserId),
    /// Username, display name, nickname or `name#1234` tag.
    ByName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GrantOutcome {
    Granted,
    AlreadyHeld,
    MemberNotFound,
    RoleNotFound,
    /// No role configured or no member to grant it to.
    Noop,
}

pub struct RoleGranter {
    gateway: Arc<dyn GuildGateway>,
    member_search_limit: u64,
}

impl RoleGranter {
    pub fn new(gateway: Arc<dyn GuildGateway>, member_search_limit: u64) -> RoleGranter {
        RoleGranter {
            gateway,
            member_search_limit: member_search_limit.clamp(1, MAX_MEMBER_SEARCH_LIMIT),
        }
    }

    /// Grants `role` to `user` unless they already have it.
    ///
    /// Not-found results are outcomes, not errors. `Err` means a request to
    /// Discord failed.
    #[tracing::instrument(skip(self))]
    pub async fn grant(
        &self,
        guild_id: GuildId,
        role: Option<&RoleRef>,
        user: Option<&UserRef>,
    ) -> anyhow::Result<GrantOutcome> {
        let (Some(role), Some(user)) = (role, user) else {
            return Ok(GrantOutcome::Noop);
        };

        let Some(role_id) = self.resolve_role(guild_id, role).await? else {
            warn!("Role {role} not found in guild {guild_id}");
            return Ok(GrantOutcome::RoleNotFound);
        };

        let Some(member) = self.resolve_member(guild_id, user).await? else {
            warn!("Member {user:?} not found in guild {guild_id}");
            return Ok(GrantOutcome::MemberNotFound);
        };

        if member.roles.contains(&role_id) {
            debug!("Member {} already has role {role_id}", member.user_id);
            return Ok(GrantOutcome::AlreadyHeld);
        }

        self.gateway
            .add_role(guild_id, member.user_id, role_id)
            .await?;
        info!("Granted role {role_id} to member {}", member.user_id);

        Ok(GrantOutcome::Granted)
    }

    /// Looks the role up among the guild's roles.
    ///
    /// Several roles with the same name resolve to the oldest one.
    pub async fn resolve_role(
        &self,
        guild_id: GuildId,
        role: &RoleRef,
    ) -> anyhow::Result<Option<RoleId>> {
        let roles = self.gateway.roles(guild_id).await?;

        let role_id = match role {
            RoleRef::ById(id) => roles.iter().find(|r| r.id == *id).map(|r| r.id),
            RoleRef::ByName(name) => {
                let name = name.to_lowercase();
                let mut matching: Vec<RoleId> = roles
                    .iter()
                    .filter(|r| r.name.to_lowercase() == name)
                    .map(|r| r.id)
                    .collect();
                matching.sort();

                if matching.len() > 1 {
                    warn!(
                        "{} roles in guild {guild_id} are named `{name}`, using the oldest one",
                        matching.len()
                    );
                }
                matching.first().copied()
            }
        };

        Ok(role_id)
    }

    /// Finds the member by id, or by name among a bounded member search.
    ///
    /// A name shared by several members resolves to nobody.
    pub async fn resolve_member(
        &self,
        guild_id: GuildId,
        user: &UserRef,
    ) -> anyhow::Result<Option<GuildMember>> {
        match user {
            UserRef::ById(user_id) => self.gateway.member(guild_id, *user_id).await,
            UserRef::ByName(name) => {
                let name = name.trim();
                let query = regex!(r"#\d{4}$").replace(name, "");
                if query.is_empty() {
                    return Ok(None);
                }

                let candidates = self
                    .gateway
                    .search_members(guild_id, &query, self.member_search_limit)
                    .await?;

                let mut matching: Vec<GuildMember> = candidates
                    .into_iter()
                    .filter(|member| member.is_named(name))
                    .collect();

                if matching.len() > 1 {
                    warn!(
                        "{} members of guild {guild_id} are named `{name}`, not picking any",
                        matching.len()
                    );
                    return Ok(None);
                }
                Ok(matching.pop())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::fake::FakeGateway;

    const GUILD: GuildId = GuildId::new(1);

    fn granter(gateway: &Arc<FakeGateway>) -> RoleGranter {
        RoleGranter::new(gateway.clone(), 100)
    }

    #[test_log::test(tokio::test)]
    async fn grants_role_by_id() {
        let gateway = Arc::new(FakeGateway::default().role(10, "Member").member(5, "luna", &[]));

        let outcome = granter(&gateway)
            .grant(
                GUILD,
                Some(&RoleRef::ById(RoleId::new(10))),
                Some(&UserRef::ById(UserId::new(5))),
            )
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Granted);
        assert_eq!(gateway.granted(), vec![(UserId::new(5), RoleId::new(10))]);
    }

    #[test_log::test(tokio::test)]
    async fn held_role_is_not_granted_again() {
        let gateway = Arc::new(
            FakeGateway::default()
                .role(10, "Member")
                .member(5, "luna", &[10]),
        );

        let outcome = granter(&gateway)
            .grant(
                GUILD,
                Some(&RoleRef::ById(RoleId::new(10))),
                Some(&UserRef::ById(UserId::new(5))),
            )
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::AlreadyHeld);
        assert!(gateway.granted().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn missing_role_or_member() {
        let gateway = Arc::new(FakeGateway::default().role(10, "Member").member(5, "luna", &[]));
        let granter = granter(&gateway);

        let no_role = granter
            .grant(
                GUILD,
                Some(&RoleRef::ById(RoleId::new(99))),
                Some(&UserRef::ById(UserId::new(5))),
            )
            .await
            .unwrap();
        let no_member = granter
            .grant(
                GUILD,
                Some(&RoleRef::ById(RoleId::new(10))),
                Some(&UserRef::ById(UserId::new(6))),
            )
            .await
            .unwrap();

        assert_eq!(no_role, GrantOutcome::RoleNotFound);
        assert_eq!(no_member, GrantOutcome::MemberNotFound);
        assert!(gateway.granted().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn nothing_to_do_without_role_or_user() {
        let gateway = Arc::new(FakeGateway::default().role(10, "Member"));
        let granter = granter(&gateway);
        let role = RoleRef::ById(RoleId::new(10));
        let user = UserRef::ById(UserId::new(5));

        assert_eq!(
            granter.grant(GUILD, None, Some(&user)).await.unwrap(),
            GrantOutcome::Noop
        );
        assert_eq!(
            granter.grant(GUILD, Some(&role), None).await.unwrap(),
            GrantOutcome::Noop
        );
    }

    #[test_log::test(tokio::test)]
    async fn role_name_is_case_insensitive_and_oldest_wins() {
        let gateway = Arc::new(
            FakeGateway::default()
                .role(30, "Registered")
                .role(20, "registered")
                .role(10, "Guest"),
        );

        let role_id = granter(&gateway)
            .resolve_role(GUILD, &RoleRef::ByName("REGISTERED".into()))
            .await
            .unwrap();

        assert_eq!(role_id, Some(RoleId::new(20)));
    }

    #[test_log::test(tokio::test)]
    async fn member_by_tag_searches_without_discriminator() {
        let gateway = Arc::new(FakeGateway::default().role(10, "Member").member(
            5,
            "Shiki#1234",
            &[],
        ));

        let outcome = granter(&gateway)
            .grant(
                GUILD,
                Some(&RoleRef::ByName("member".into())),
                Some(&UserRef::ByName("shiki#1234".into())),
            )
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Granted);
        assert_eq!(
            *gateway.searches.lock().unwrap(),
            vec![("shiki".to_string(), 100)]
        );
    }

    #[test_log::test(tokio::test)]
    async fn member_name_must_match_exactly() {
        let gateway = Arc::new(FakeGateway::default().member(5, "Lunatic", &[]));

        let member = granter(&gateway)
            .resolve_member(GUILD, &UserRef::ByName("luna".into()))
            .await
            .unwrap();

        assert_eq!(member, None);
    }

    #[test_log::test(tokio::test)]
    async fn ambiguous_member_name_resolves_to_nobody() {
        let gateway = Arc::new(
            FakeGateway::default()
                .member(5, "Luna", &[])
                .member(6, "luna", &[]),
        );

        let member = granter(&gateway)
            .resolve_member(GUILD, &UserRef::ByName("luna".into()))
            .await
            .unwrap();

        assert_eq!(member, None);
    }

    #[test_log::test(tokio::test)]
    async fn search_limit_is_bounded() {
        let gateway = Arc::new(FakeGateway::default());

        RoleGranter::new(gateway.clone(), 50_000)
            .resolve_member(GUILD, &UserRef::ByName("luna".into()))
            .await
            .unwrap();

        assert_eq!(gateway.searches.lock().unwrap()[0].1, MAX_MEMBER_SEARCH_LIMIT);
    }

    #[test_log::test(tokio::test)]
    async fn failed_lookups_are_errors() {
        let gateway = Arc::new(FakeGateway {
            fail_role_lookups: true,
            ..Default::default()
        });

        let result = granter(&gateway)
            .grant(
                GUILD,
                Some(&RoleRef::ById(RoleId::new(10))),
                Some(&UserRef::ById(UserId::new(5))),
            )
            .await;

        assert!(result.is_err());
    }
}
