// Explicit command registration: name -> grammar, handler and scope.
//
// The table is built once at startup and handed to whatever receives chat
// events. Dispatch parses arguments against the grammar, enforces the
// guild-only scope, runs the handler and turns any error into a warning
// reply so no error escapes a command.

use super::command_models::{ArgSpec, Args, CommandError, Invocation};
use super::directory::Directory;
use super::grammar::parse_args;
use super::reply::Reply;
use futures::future::BoxFuture;
use std::collections::BTreeMap;

/// Everything a handler may look at while it runs.
pub struct CommandContext<'a, S> {
    pub state: &'a S,
    pub invocation: &'a Invocation,
    pub directory: &'a dyn Directory,
}

impl<S> Clone for CommandContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for CommandContext<'_, S> {}

pub type HandlerResult<'a> = BoxFuture<'a, Result<Reply, CommandError>>;
pub type Handler<S> = for<'a> fn(CommandContext<'a, S>, Args) -> HandlerResult<'a>;

pub struct CommandEntry<S> {
    pub name: &'static str,
    pub description: &'static str,
    pub grammar: Vec<ArgSpec>,
    /// Global commands also work outside guilds (DMs).
    pub global: bool,
    pub handler: Handler<S>,
}

impl<S> CommandEntry<S> {
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{}{}", prefix, self.name);
        for spec in &self.grammar {
            usage.push(' ');
            usage.push_str(&spec.usage());
        }
        usage
    }
}

pub struct CommandTable<S> {
    entries: BTreeMap<&'static str, CommandEntry<S>>,
}

impl<S> Default for CommandTable<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<S: Send + Sync> CommandTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        grammar: Vec<ArgSpec>,
        global: bool,
        handler: Handler<S>,
    ) -> &mut Self {
        if self.entries.contains_key(name) {
            tracing::warn!(command = name, "Command registered twice, keeping the latest");
        }
        self.entries.insert(
            name,
            CommandEntry {
                name,
                description,
                grammar,
                global,
                handler,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry<S>> {
        self.entries.get(name)
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry<S>> {
        self.entries.values()
    }

    /// Run one invocation. Returns `None` for unknown commands so the caller
    /// can stay silent on ordinary chat that happens to start with the prefix.
    pub async fn dispatch(
        &self,
        state: &S,
        invocation: &Invocation,
        directory: &dyn Directory,
    ) -> Option<Reply> {
        let entry = self.get(&invocation.command)?;

        let outcome = self.run(entry, state, invocation, directory).await;
        Some(match outcome {
            Ok(reply) => {
                tracing::debug!(command = entry.name, author = invocation.author_id, "Command completed");
                reply
            }
            Err(err) => {
                tracing::warn!(
                    command = entry.name,
                    author = invocation.author_id,
                    error = %err,
                    "Command failed"
                );
                Reply::warning(err)
            }
        })
    }

    async fn run(
        &self,
        entry: &CommandEntry<S>,
        state: &S,
        invocation: &Invocation,
        directory: &dyn Directory,
    ) -> Result<Reply, CommandError> {
        if !entry.global && invocation.guild_id.is_none() {
            return Err(CommandError::GuildOnly);
        }

        let args = parse_args(&entry.grammar, &invocation.raw_args, directory).await?;
        let ctx = CommandContext {
            state,
            invocation,
            directory,
        };
        (entry.handler)(ctx, args).await
    }
}
