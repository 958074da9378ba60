// Builds the `info` embed from already-resolved user and member data.

use crate::core::commands::{Embed, MemberProfile, UserProfile};
use chrono::{DateTime, Utc};

/// Milliseconds between the Unix epoch and the first second of 2015, where
/// Discord IDs start counting.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Shared timestamp layout for user-facing dates.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Creation time encoded in the top 42 bits of a snowflake ID.
pub fn snowflake_created_at(id: u64) -> Option<DateTime<Utc>> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    DateTime::<Utc>::from_timestamp_millis(i64::try_from(millis).ok()?)
}

pub fn build_info_embed(user: &UserProfile, member: Option<&MemberProfile>, color: u32) -> Embed {
    let nickname = member
        .and_then(|m| m.nickname.clone())
        .unwrap_or_else(|| "`No Nickname`".to_string());

    let created = snowflake_created_at(user.id)
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "`Unknown`".to_string());

    let joined = member
        .and_then(|m| m.joined_at)
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "`Unknown`".to_string());

    let roles = member.map(|m| m.roles.join(", ")).unwrap_or_default();
    let roles = if roles.is_empty() {
        "no roles".to_string()
    } else {
        roles
    };

    Embed {
        color: Some(color),
        thumbnail: Some(user.avatar_url.clone()),
        ..Default::default()
    }
    .field("Username", user.tag.clone(), true)
    .field("Nickname", nickname, true)
    .field("ID", user.id.to_string(), true)
    .field("Creation Date", created, true)
    .field("Join Date", joined, true)
    .field("Roles", roles, false)
}
