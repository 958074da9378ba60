pub mod history_models;
pub mod history_service;
pub mod humanize;

pub use history_models::{MessageScope, StoredMessage, WordCount};
pub use history_service::{tally_words, HistoryService, MessageStore, WordTally};
pub use humanize::natural_time;
