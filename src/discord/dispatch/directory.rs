// `Directory` over serenity's cache, falling back to the HTTP API when the
// cache has not seen a user or member yet. Cache guards are never held
// across an await.

use crate::core::commands::{Directory, GuildRef, IdKind, MemberProfile, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

pub struct SerenityDirectory<'a> {
    ctx: &'a serenity::Context,
}

impl<'a> SerenityDirectory<'a> {
    pub fn new(ctx: &'a serenity::Context) -> Self {
        Self { ctx }
    }
}

fn user_profile(user: &serenity::User) -> UserProfile {
    UserProfile {
        id: user.id.get(),
        tag: user.tag(),
        avatar_url: user.face(),
    }
}

fn member_profile(
    member: &serenity::Member,
    roles: &HashMap<serenity::RoleId, serenity::Role>,
) -> MemberProfile {
    MemberProfile {
        nickname: member.nick.clone(),
        joined_at: member
            .joined_at
            .and_then(|at| DateTime::<Utc>::from_timestamp(at.unix_timestamp(), 0)),
        roles: member
            .roles
            .iter()
            .filter_map(|id| roles.get(id).map(|role| role.name.clone()))
            .collect(),
    }
}

#[async_trait]
impl Directory for SerenityDirectory<'_> {
    async fn user(&self, user_id: u64) -> Option<UserProfile> {
        if user_id == 0 {
            return None;
        }
        let user_id = serenity::UserId::new(user_id);

        let cached = self.ctx.cache.user(user_id).map(|user| user_profile(&user));
        if cached.is_some() {
            return cached;
        }

        match user_id.to_user(self.ctx).await {
            Ok(user) => Some(user_profile(&user)),
            Err(e) => {
                tracing::debug!(user = user_id.get(), "User lookup failed: {}", e);
                None
            }
        }
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Option<MemberProfile> {
        if guild_id == 0 || user_id == 0 {
            return None;
        }
        let guild_id = serenity::GuildId::new(guild_id);
        let user_id = serenity::UserId::new(user_id);

        let cached = self.ctx.cache.guild(guild_id).and_then(|guild| {
            guild
                .members
                .get(&user_id)
                .map(|member| member_profile(member, &guild.roles))
        });
        if cached.is_some() {
            return cached;
        }

        let member = guild_id.member(self.ctx, user_id).await.ok()?;
        let roles = guild_id.roles(&self.ctx.http).await.unwrap_or_default();
        Some(member_profile(&member, &roles))
    }

    async fn emoji_owner(&self, emoji_id: u64) -> Option<GuildRef> {
        if emoji_id == 0 {
            return None;
        }
        let emoji_id = serenity::EmojiId::new(emoji_id);

        self.ctx.cache.guilds().into_iter().find_map(|guild_id| {
            let guild = self.ctx.cache.guild(guild_id)?;
            guild.emojis.contains_key(&emoji_id).then(|| GuildRef {
                id: guild.id.get(),
                name: guild.name.clone(),
            })
        })
    }

    async fn classify(&self, id: u64) -> Option<IdKind> {
        if id == 0 {
            return None;
        }
        let cache = &self.ctx.cache;

        if cache.guild(serenity::GuildId::new(id)).is_some() {
            Some(IdKind::Guild)
        } else if cache.channel(serenity::ChannelId::new(id)).is_some() {
            Some(IdKind::Channel)
        } else if cache.user(serenity::UserId::new(id)).is_some() {
            Some(IdKind::User)
        } else {
            None
        }
    }
}
