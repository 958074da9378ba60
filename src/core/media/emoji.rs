// Emoji references and the CDN URLs their images live at.

use regex::Regex;
use std::sync::OnceLock;

fn custom_emoji_regex() -> &'static Regex {
    static EMOJI_RE: OnceLock<Regex> = OnceLock::new();
    EMOJI_RE.get_or_init(|| Regex::new(r"^<:(.+):([0-9]+)>").expect("static regex"))
}

/// A guild emoji as written in a message: `<:name:id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEmoji {
    pub name: String,
    pub id: u64,
}

pub fn parse_custom_emoji(token: &str) -> Option<CustomEmoji> {
    let caps = custom_emoji_regex().captures(token)?;
    Some(CustomEmoji {
        name: caps[1].to_string(),
        id: caps[2].parse().ok()?,
    })
}

/// Twemoji file stem for a unicode emoji: code points in lowercase hex,
/// no leading zeros, joined by `-`. "👍🏽" becomes `1f44d-1f3fd`.
pub fn twemoji_codepoints(emoji: &str) -> String {
    emoji
        .chars()
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone)]
pub struct EmojiCdn {
    /// Base for custom emojis, e.g. `https://cdn.discordapp.com/emojis`.
    pub custom_base: String,
    /// Base for unicode emojis rendered by Twemoji.
    pub twemoji_base: String,
}

impl EmojiCdn {
    pub fn custom_url(&self, id: u64) -> String {
        format!("{}/{}.png", self.custom_base.trim_end_matches('/'), id)
    }

    /// URL for any emoji token, custom or unicode.
    pub fn url_for(&self, token: &str) -> String {
        match parse_custom_emoji(token) {
            Some(emoji) => self.custom_url(emoji.id),
            None => format!(
                "{}/{}.png",
                self.twemoji_base.trim_end_matches('/'),
                twemoji_codepoints(token)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdn() -> EmojiCdn {
        EmojiCdn {
            custom_base: "https://cdn.test/emojis/".into(),
            twemoji_base: "https://twemoji.test/72x72".into(),
        }
    }

    #[test]
    fn parses_custom_emoji() {
        assert_eq!(
            parse_custom_emoji("<:foo:123>"),
            Some(CustomEmoji {
                name: "foo".into(),
                id: 123
            })
        );
        assert_eq!(parse_custom_emoji("notanemoji"), None);
        assert_eq!(parse_custom_emoji(":foo:"), None);
    }

    #[test]
    fn codepoints_drop_leading_zeros() {
        assert_eq!(twemoji_codepoints("\u{1F44D}"), "1f44d");
        assert_eq!(twemoji_codepoints("\u{1F44D}\u{1F3FD}"), "1f44d-1f3fd");
        assert_eq!(twemoji_codepoints("\u{00A9}"), "a9");
    }

    #[test]
    fn urls_for_both_kinds() {
        let cdn = cdn();
        assert_eq!(cdn.url_for("<:foo:123>"), "https://cdn.test/emojis/123.png");
        assert_eq!(
            cdn.url_for("\u{2764}\u{FE0F}"),
            "https://twemoji.test/72x72/2764-fe0f.png"
        );
    }
}
