// Argument grammar: turns the raw argument string of an invocation into typed
// values, before any handler runs.

use super::command_models::{ArgKind, ArgSpec, ArgValue, Args, CommandError, Target};
use super::directory::{Directory, IdKind};
use regex::Regex;
use std::sync::OnceLock;

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(r"(https?://[^\s]+)").expect("static regex"))
}

/// Parse `raw` against `grammar`. Tokens are consumed left to right; `Tail`
/// and `Url` consume everything that is left. Extra tokens are ignored.
pub async fn parse_args(
    grammar: &[ArgSpec],
    raw: &str,
    directory: &dyn Directory,
) -> Result<Args, CommandError> {
    let mut rest = raw.trim();
    let mut values = Vec::with_capacity(grammar.len());

    for spec in grammar {
        match spec.kind {
            ArgKind::Tail => {
                if rest.is_empty() {
                    return Err(missing(spec));
                }
                values.push(ArgValue::Text(rest.to_string()));
                rest = "";
            }
            ArgKind::Url => {
                values.push(ArgValue::Url(extract_single_url(rest, spec)?));
                rest = "";
            }
            ArgKind::Str | ArgKind::User | ArgKind::Target => {
                let (token, remainder) = next_token(rest);
                if token.is_empty() {
                    return Err(missing(spec));
                }
                rest = remainder;

                let value = match spec.kind {
                    ArgKind::Str => ArgValue::Text(token.to_string()),
                    ArgKind::User => ArgValue::User(
                        parse_user(token)
                            .ok_or_else(|| CommandError::invalid(format!("`{}` is not a user", token)))?,
                    ),
                    _ => ArgValue::Target(parse_target(token, directory).await.ok_or_else(|| {
                        CommandError::invalid(format!(
                            "`{}` is not a user, channel or guild",
                            token
                        ))
                    })?),
                };
                values.push(value);
            }
        }
    }

    Ok(Args::new(values))
}

fn missing(spec: &ArgSpec) -> CommandError {
    CommandError::invalid(format!("missing argument {}", spec.usage()))
}

fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim_start()),
        None => (input, ""),
    }
}

/// Exactly one URL must appear. Discord's `<url>` embed suppression leaves a
/// trailing `>` which is dropped.
fn extract_single_url(input: &str, spec: &ArgSpec) -> Result<String, CommandError> {
    let urls: Vec<&str> = url_regex()
        .find_iter(input)
        .map(|m| m.as_str())
        .collect();

    if urls.len() != 1 {
        return Err(CommandError::invalid(format!("Invalid {} URL", spec.name)));
    }

    let url = urls[0];
    Ok(url.strip_suffix('>').unwrap_or(url).to_string())
}

fn parse_snowflake(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// `<@id>`, `<@!id>` or a bare ID.
pub fn parse_user(token: &str) -> Option<u64> {
    if let Some(inner) = token.strip_prefix("<@").and_then(|t| t.strip_suffix('>')) {
        return parse_snowflake(inner.strip_prefix('!').unwrap_or(inner));
    }
    parse_snowflake(token)
}

async fn parse_target(token: &str, directory: &dyn Directory) -> Option<Target> {
    if let Some(inner) = token.strip_prefix("<#").and_then(|t| t.strip_suffix('>')) {
        return parse_snowflake(inner).map(Target::Channel);
    }
    if token.starts_with("<@") {
        return parse_user(token).map(Target::User);
    }

    let id = parse_snowflake(token)?;
    Some(match directory.classify(id).await {
        Some(IdKind::Guild) => Target::Guild(id),
        Some(IdKind::Channel) => Target::Channel(id),
        Some(IdKind::User) | None => Target::User(id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::directory::{GuildRef, MemberProfile, UserProfile};
    use async_trait::async_trait;

    struct KnownIds;

    #[async_trait]
    impl Directory for KnownIds {
        async fn user(&self, _: u64) -> Option<UserProfile> {
            None
        }
        async fn member(&self, _: u64, _: u64) -> Option<MemberProfile> {
            None
        }
        async fn emoji_owner(&self, _: u64) -> Option<GuildRef> {
            None
        }
        async fn classify(&self, id: u64) -> Option<IdKind> {
            match id {
                10 => Some(IdKind::Guild),
                20 => Some(IdKind::Channel),
                _ => None,
            }
        }
    }

    fn grammar(kind: ArgKind) -> Vec<ArgSpec> {
        vec![ArgSpec::new("arg", kind)]
    }

    #[tokio::test]
    async fn str_takes_one_token() {
        let args = parse_args(&grammar(ArgKind::Str), "a@b.com extra", &KnownIds)
            .await
            .unwrap();
        assert_eq!(args.text(0).unwrap(), "a@b.com");
    }

    #[tokio::test]
    async fn tail_takes_everything_and_must_not_be_empty() {
        let args = parse_args(&grammar(ArgKind::Tail), "  big  red dog ", &KnownIds)
            .await
            .unwrap();
        assert_eq!(args.text(0).unwrap(), "big  red dog");

        let err = parse_args(&grammar(ArgKind::Tail), "   ", &KnownIds)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing argument <arg...>");
    }

    #[tokio::test]
    async fn user_accepts_mentions_and_ids() {
        for raw in ["<@42>", "<@!42>", "42"] {
            let args = parse_args(&grammar(ArgKind::User), raw, &KnownIds)
                .await
                .unwrap();
            assert_eq!(args.user(0).unwrap(), 42);
        }
        assert!(parse_args(&grammar(ArgKind::User), "bob", &KnownIds)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn url_requires_exactly_one() {
        let spec = vec![ArgSpec::new("image", ArgKind::Url)];
        let args = parse_args(&spec, "look <https://x.test/a.png>", &KnownIds)
            .await
            .unwrap();
        assert_eq!(args.url(0).unwrap(), "https://x.test/a.png");

        let err = parse_args(&spec, "no links here", &KnownIds)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid image URL");

        let err = parse_args(&spec, "http://a.test http://b.test", &KnownIds)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid image URL");
    }

    #[tokio::test]
    async fn target_resolves_each_variant() {
        let g = grammar(ArgKind::Target);
        let parse = |raw: &'static str| {
            let g = g.clone();
            async move {
                parse_args(&g, raw, &KnownIds)
                    .await
                    .unwrap()
                    .target(0)
                    .unwrap()
            }
        };
        assert_eq!(parse("<@5>").await, Target::User(5));
        assert_eq!(parse("<#6>").await, Target::Channel(6));
        assert_eq!(parse("10").await, Target::Guild(10));
        assert_eq!(parse("20").await, Target::Channel(20));
        assert_eq!(parse("30").await, Target::User(30));
    }

    #[tokio::test]
    async fn grammars_consume_left_to_right() {
        let spec = vec![
            ArgSpec::new("user", ArgKind::User),
            ArgSpec::new("reason", ArgKind::Tail),
        ];
        let args = parse_args(&spec, "<@1> being   rude", &KnownIds)
            .await
            .unwrap();
        assert_eq!(args.user(0).unwrap(), 1);
        assert_eq!(args.text(1).unwrap(), "being   rude");
    }
}
