pub mod compose;
pub mod emoji;
pub mod media_service;

pub use emoji::{parse_custom_emoji, CustomEmoji, EmojiCdn};
pub use media_service::{MediaConfig, MediaFetcher, MediaService};
