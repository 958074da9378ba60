// Process configuration, read once at startup from the environment
// (after `.env` has been loaded).

use crate::core::media::EmojiCdn;
use crate::infra::http::LookupEndpoints;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// User-supplied image URLs get longer than the bot's own API calls.
const USER_URL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub prefix: String,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
    pub user_url_timeout: Duration,
    pub hibp_api_key: Option<String>,
    pub endpoints: LookupEndpoints,
    pub search_url: String,
    pub emoji_cdn: EmojiCdn,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(10),
        };

        let defaults = LookupEndpoints::default();
        let endpoints = LookupEndpoints {
            cat: or("CAT_API_URL", &defaults.cat),
            urban: or("URBAN_API_URL", &defaults.urban),
            hibp: or("HIBP_API_URL", &defaults.hibp),
            geoip: or("GEOIP_API_URL", &defaults.geoip),
        };

        Ok(Self {
            discord_token,
            prefix: or("BOT_PREFIX", "!"),
            data_dir: PathBuf::from(or("DATA_DIR", "data")),
            http_timeout,
            user_url_timeout: USER_URL_TIMEOUT,
            hibp_api_key: get("HIBP_API_KEY"),
            endpoints,
            search_url: or("SEARCH_URL", "https://www.google.com/search"),
            emoji_cdn: EmojiCdn {
                custom_base: or("EMOJI_CDN_URL", "https://cdn.discordapp.com/emojis"),
                twemoji_base: or(
                    "TWEMOJI_CDN_URL",
                    "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/72x72",
                ),
            },
        })
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("DISCORD_TOKEN"));
        assert_eq!(
            config(&[("DISCORD_TOKEN", "  ")]).unwrap_err(),
            ConfigError::Missing("DISCORD_TOKEN")
        );
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(cfg.prefix, "!");
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
        assert_eq!(cfg.user_url_timeout, Duration::from_secs(15));
        assert_eq!(cfg.hibp_api_key, None);
        assert_eq!(cfg.history_db_path(), PathBuf::from("data").join("history.db"));
        assert_eq!(cfg.emoji_cdn.custom_base, "https://cdn.discordapp.com/emojis");
        assert_eq!(cfg.endpoints.hibp, LookupEndpoints::default().hibp);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("BOT_PREFIX", "?"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("HIBP_API_KEY", "key"),
            ("CAT_API_URL", "http://localhost:9000/cats"),
        ])
        .unwrap();
        assert_eq!(cfg.prefix, "?");
        assert_eq!(cfg.http_timeout, Duration::from_secs(3));
        assert_eq!(cfg.hibp_api_key.as_deref(), Some("key"));
        assert_eq!(cfg.endpoints.cat, "http://localhost:9000/cats");
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["zero", "0", "-4"] {
            let err = config(&[("DISCORD_TOKEN", "abc"), ("HTTP_TIMEOUT_SECS", raw)]).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key: "HTTP_TIMEOUT_SECS",
                    value: raw.to_string()
                }
            );
        }
    }
}
