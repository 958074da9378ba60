// Read-only view of the chat platform's users, members, guilds and emojis.
// The Discord layer implements this over serenity's cache; tests use fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    /// Display tag, e.g. `name` or `name#1234`.
    pub tag: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub nickname: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    /// Role names, in the order the platform reports them.
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: u64,
    pub name: String,
}

/// What a bare numeric ID refers to, when the directory knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Channel,
    Guild,
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn user(&self, user_id: u64) -> Option<UserProfile>;
    async fn member(&self, guild_id: u64, user_id: u64) -> Option<MemberProfile>;
    /// The guild that owns a custom emoji, if any guild we can see does.
    async fn emoji_owner(&self, emoji_id: u64) -> Option<GuildRef>;
    async fn classify(&self, id: u64) -> Option<IdKind>;
}
