// Read access to recorded chat history (`seen`, `words`) plus the write path
// the message listener uses to record it.

use super::history_models::{MessageScope, StoredMessage, WordCount};
use crate::core::commands::CommandError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Rows a single word count may scan before it stops.
pub const WORD_SCAN_LIMIT: u64 = 3_000_000;
/// Rows shown by the `words` command.
pub const TOP_WORDS: usize = 30;

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn record(&self, message: &StoredMessage) -> Result<(), CommandError>;
    /// Timestamp of the newest message by this author.
    async fn last_message_at(&self, author_id: u64) -> Result<Option<DateTime<Utc>>, CommandError>;
    /// Most frequent words within `scope`, reading at most `scan_limit` rows.
    async fn top_words(
        &self,
        scope: MessageScope,
        limit: usize,
        scan_limit: u64,
    ) -> Result<Vec<WordCount>, CommandError>;
}

/// Running word frequency over message contents. Words are split on
/// whitespace and anything containing a code fence is skipped.
#[derive(Debug, Default)]
pub struct WordTally {
    counts: HashMap<String, u64>,
}

impl WordTally {
    pub fn add(&mut self, content: &str) {
        for word in content.split_whitespace() {
            if word.contains("```") {
                continue;
            }
            *self.counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    /// The `limit` most frequent words, ties broken alphabetically.
    pub fn top(self, limit: usize) -> Vec<WordCount> {
        let mut words: Vec<WordCount> = self
            .counts
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        words.truncate(limit);
        words
    }
}

pub fn tally_words<I, S>(contents: I, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tally = WordTally::default();
    for content in contents {
        tally.add(content.as_ref());
    }
    tally.top(limit)
}

pub struct HistoryService {
    store: Arc<dyn MessageStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, message: &StoredMessage) -> Result<(), CommandError> {
        self.store.record(message).await
    }

    pub async fn last_seen(&self, user_id: u64) -> Result<Option<DateTime<Utc>>, CommandError> {
        self.store.last_message_at(user_id).await
    }

    pub async fn top_words(&self, scope: MessageScope) -> Result<Vec<WordCount>, CommandError> {
        self.store.top_words(scope, TOP_WORDS, WORD_SCAN_LIMIT).await
    }
}
