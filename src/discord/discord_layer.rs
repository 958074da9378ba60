// Discord layer - poise/serenity glue around the core command table.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "dispatch/mod.rs"]
pub mod dispatch;

use crate::core::commands::CommandTable;
use crate::core::utilities::Utilities;
use std::sync::Arc;

/// Shared state handed to every poise command and event.
pub struct Data {
    pub commands: Arc<CommandTable<Utilities>>,
    pub utilities: Arc<Utilities>,
    pub prefix: String,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
