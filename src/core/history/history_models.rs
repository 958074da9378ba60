use chrono::{DateTime, Utc};

/// A chat message as kept in the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub message_id: u64,
    pub author_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Which slice of history a word count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScope {
    Author(u64),
    Channel(u64),
    Guild(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}
