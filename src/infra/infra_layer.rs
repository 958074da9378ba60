// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "http/mod.rs"]
pub mod http;

#[path = "history/mod.rs"]
pub mod history;
