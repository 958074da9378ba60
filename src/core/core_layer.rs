// The core module contains all command logic.
// Each feature gets its own submodule; none of them import serenity or poise.

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "history/mod.rs"]
pub mod history;

#[path = "lookups/mod.rs"]
pub mod lookups;

#[path = "media/mod.rs"]
pub mod media;

#[path = "utilities/mod.rs"]
pub mod utilities;
