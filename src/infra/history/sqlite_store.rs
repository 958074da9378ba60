use crate::core::commands::CommandError;
use crate::core::history::{MessageScope, MessageStore, StoredMessage, WordCount, WordTally};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::TryStreamExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// Message history kept in SQLite. Timestamps are stored as fixed-width
/// RFC 3339 text so they sort lexically.
pub struct SqliteMessageStore {
    pool: Pool<Sqlite>,
}

fn store_error(err: sqlx::Error) -> CommandError {
    CommandError::Store(err.to_string())
}

fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SqliteMessageStore {
    /// Open (or create) the database at `database_path`. `:memory:` gives a
    /// private in-memory database.
    pub async fn new(database_path: &str) -> anyhow::Result<Self> {
        let pool = if database_path == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?
        } else {
            if let Some(parent) = Path::new(database_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&format!("sqlite://{}?mode=rwc", database_path))
                .await?
        };

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY,
                author_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                guild_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_author
            ON messages(author_id, timestamp DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_channel ON messages(channel_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_guild ON messages(guild_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn record(&self, message: &StoredMessage) -> Result<(), CommandError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO messages (id, author_id, channel_id, guild_id, content, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.message_id as i64)
        .bind(message.author_id as i64)
        .bind(message.channel_id as i64)
        .bind(message.guild_id as i64)
        .bind(&message.content)
        .bind(encode_timestamp(&message.timestamp))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn last_message_at(&self, author_id: u64) -> Result<Option<DateTime<Utc>>, CommandError> {
        let row = sqlx::query(
            "SELECT timestamp FROM messages WHERE author_id = ? ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(author_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("timestamp").map_err(store_error)?;
        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| CommandError::Store(format!("bad timestamp {:?}: {}", raw, e)))?;
        Ok(Some(parsed.with_timezone(&Utc)))
    }

    async fn top_words(
        &self,
        scope: MessageScope,
        limit: usize,
        scan_limit: u64,
    ) -> Result<Vec<WordCount>, CommandError> {
        let (column, id) = match scope {
            MessageScope::Author(id) => ("author_id", id),
            MessageScope::Channel(id) => ("channel_id", id),
            MessageScope::Guild(id) => ("guild_id", id),
        };
        let sql = format!("SELECT content FROM messages WHERE {} = ? LIMIT ?", column);

        let mut rows = sqlx::query(&sql)
            .bind(id as i64)
            .bind(scan_limit as i64)
            .fetch(&self.pool);

        let mut tally = WordTally::default();
        let mut scanned: u64 = 0;
        while let Some(row) = rows.try_next().await.map_err(store_error)? {
            let content: String = row.try_get("content").map_err(store_error)?;
            tally.add(&content);
            scanned += 1;
        }
        tracing::debug!(?scope, scanned, "Counted words");

        Ok(tally.top(limit))
    }
}
