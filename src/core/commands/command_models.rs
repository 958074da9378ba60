// Types shared by every utility command: the invocation, the argument grammar
// and the error taxonomy. Nothing in here knows about serenity or poise.

use thiserror::Error;

/// Errors a command can raise. The dispatcher turns every variant into a
/// short warning reply, so the `Display` text is user facing.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("could not read the response: {0}")]
    Decode(String),
    #[error("message history is unavailable: {0}")]
    Store(String),
    #[error("this command only works in servers")]
    GuildOnly,
}

impl CommandError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CommandError::InvalidArgument(message.into())
    }

    /// True when the remote answered 404, which some lookups treat as "no data".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::Status { status: 404, .. })
    }
}

/// One command as typed by a user, before argument parsing.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub raw_args: String,
    pub author_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
}

impl Invocation {
    /// Split `"{prefix}{name} {args}"` into an invocation. Returns `None`
    /// when the text does not start with the prefix or names no command.
    pub fn parse(
        content: &str,
        prefix: &str,
        author_id: u64,
        channel_id: u64,
        guild_id: Option<u64>,
    ) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?;
        let rest = rest.trim_start();
        let (command, raw_args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };

        if command.is_empty() {
            return None;
        }

        Some(Self {
            command: command.to_lowercase(),
            raw_args: raw_args.to_string(),
            author_id,
            channel_id,
            guild_id,
        })
    }
}

/// The typed tokens a command grammar can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A single whitespace-delimited token.
    Str,
    /// Everything left in the input, must not be empty.
    Tail,
    /// A user mention or a bare user ID.
    User,
    /// Exactly one http(s) URL somewhere in the rest of the input.
    Url,
    /// A user, channel or guild reference.
    Target,
}

#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
}

impl ArgSpec {
    pub const fn new(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind }
    }

    /// Usage fragment such as `<term...>` or `<target:user|channel|guild>`.
    pub fn usage(&self) -> String {
        match self.kind {
            ArgKind::Str => format!("<{}>", self.name),
            ArgKind::Tail => format!("<{}...>", self.name),
            ArgKind::User => format!("<{}:user>", self.name),
            ArgKind::Url => format!("<{}:url>", self.name),
            ArgKind::Target => format!("<{}:user|channel|guild>", self.name),
        }
    }
}

/// A polymorphic reference, resolved to a concrete kind at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User(u64),
    Channel(u64),
    Guild(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    User(u64),
    Url(String),
    Target(Target),
}

/// Parsed arguments in grammar order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<ArgValue>,
}

impl Args {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self { values }
    }

    pub fn text(&self, idx: usize) -> Result<&str, CommandError> {
        match self.values.get(idx) {
            Some(ArgValue::Text(value)) => Ok(value),
            _ => Err(mismatch(idx, "text")),
        }
    }

    pub fn user(&self, idx: usize) -> Result<u64, CommandError> {
        match self.values.get(idx) {
            Some(ArgValue::User(id)) => Ok(*id),
            _ => Err(mismatch(idx, "user")),
        }
    }

    pub fn url(&self, idx: usize) -> Result<&str, CommandError> {
        match self.values.get(idx) {
            Some(ArgValue::Url(url)) => Ok(url),
            _ => Err(mismatch(idx, "url")),
        }
    }

    pub fn target(&self, idx: usize) -> Result<Target, CommandError> {
        match self.values.get(idx) {
            Some(ArgValue::Target(target)) => Ok(*target),
            _ => Err(mismatch(idx, "target")),
        }
    }
}

fn mismatch(idx: usize, expected: &str) -> CommandError {
    CommandError::invalid(format!("argument {} is not a {}", idx + 1, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_splits_name_and_arguments() {
        let inv = Invocation::parse("!urban  hello world ", "!", 1, 2, Some(3)).unwrap();
        assert_eq!(inv.command, "urban");
        assert_eq!(inv.raw_args, "hello world");
        assert_eq!(inv.guild_id, Some(3));
    }

    #[test]
    fn invocation_requires_prefix_and_name() {
        assert!(Invocation::parse("urban foo", "!", 1, 2, None).is_none());
        assert!(Invocation::parse("!", "!", 1, 2, None).is_none());
        assert!(Invocation::parse("! ", "!", 1, 2, None).is_none());
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let inv = Invocation::parse("!COIN", "!", 1, 2, None).unwrap();
        assert_eq!(inv.command, "coin");
        assert_eq!(inv.raw_args, "");
    }

    #[test]
    fn args_report_type_mismatches() {
        let args = Args::new(vec![ArgValue::Text("x".into())]);
        assert_eq!(args.text(0).unwrap(), "x");
        assert!(args.user(0).is_err());
        assert!(args.text(1).is_err());
    }

    #[test]
    fn not_found_is_only_404() {
        let err = CommandError::Status {
            status: 404,
            url: "u".into(),
        };
        assert!(err.is_not_found());
        let err = CommandError::Status {
            status: 500,
            url: "u".into(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn usage_strings_follow_the_grammar() {
        assert_eq!(ArgSpec::new("term", ArgKind::Tail).usage(), "<term...>");
        assert_eq!(
            ArgSpec::new("target", ArgKind::Target).usage(),
            "<target:user|channel|guild>"
        );
    }
}
