// Slash commands registered with poise. The prefix commands live in the core
// command table and are dispatched from the message event instead.

pub mod help;
