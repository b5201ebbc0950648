use std::{env, fs, path::Path, time::Duration};

use crate::{domain::GroupTarget, errors::Error, Result};

/// Typed configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    pub target_group: GroupTarget,

    // Behavior
    pub anonymous_by_default: bool,
    pub channel_url: Option<String>,

    // Gateway
    pub gateway_timeout: Duration,
    pub throttle_global: Duration,
    pub throttle_per_chat: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config(
                "BOT_TOKEN environment variable is required (add BOT_TOKEN=<token> to .env)"
                    .to_string(),
            )
        })?;

        let raw_target = lookup("TARGET_GROUP_ID").and_then(non_empty).ok_or_else(|| {
            Error::Config(
                "TARGET_GROUP_ID environment variable is required (numeric id or @handle)"
                    .to_string(),
            )
        })?;
        let target_group = GroupTarget::parse(&raw_target).ok_or_else(|| {
            Error::Config(format!(
                "TARGET_GROUP_ID must be a numeric chat id or an @handle, got {raw_target:?}"
            ))
        })?;

        let anonymous_by_default = lookup("ANONYMOUS_MODE")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);
        let channel_url = lookup("CHANNEL_URL").and_then(non_empty);

        let ms = |key: &str, default: u64| {
            Duration::from_millis(
                lookup(key)
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(default),
            )
        };
        let gateway_timeout = ms("GATEWAY_TIMEOUT_MS", 15_000);
        let throttle_global = ms("THROTTLE_GLOBAL_MS", 40);
        let throttle_per_chat = ms("THROTTLE_PER_CHAT_MS", 1050);

        Ok(Self {
            bot_token,
            target_group,
            anonymous_by_default,
            channel_url,
            gateway_timeout,
            throttle_global,
            throttle_per_chat,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = Config::from_lookup(lookup(&[("TARGET_GROUP_ID", "-100")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("BOT_TOKEN")));
    }

    #[test]
    fn missing_or_bad_target_is_fatal() {
        let err = Config::from_lookup(lookup(&[("BOT_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("TARGET_GROUP_ID")));

        let err = Config::from_lookup(lookup(&[("BOT_TOKEN", "t"), ("TARGET_GROUP_ID", "grp")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("grp")));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[
            ("BOT_TOKEN", "t"),
            ("TARGET_GROUP_ID", "-1001"),
        ]))
        .unwrap();
        assert_eq!(cfg.target_group, GroupTarget::Id(ChatId(-1001)));
        assert!(cfg.anonymous_by_default);
        assert_eq!(cfg.channel_url, None);
        assert_eq!(cfg.gateway_timeout, Duration::from_secs(15));
    }

    #[test]
    fn overrides_apply() {
        let cfg = Config::from_lookup(lookup(&[
            ("BOT_TOKEN", "t"),
            ("TARGET_GROUP_ID", "@staff"),
            ("ANONYMOUS_MODE", "off"),
            ("CHANNEL_URL", "https://t.me/x"),
            ("GATEWAY_TIMEOUT_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(cfg.target_group, GroupTarget::Handle("@staff".to_string()));
        assert!(!cfg.anonymous_by_default);
        assert_eq!(cfg.channel_url.as_deref(), Some("https://t.me/x"));
        assert_eq!(cfg.gateway_timeout, Duration::from_millis(500));
    }

    #[test]
    fn dotenv_parsing_strips_quotes_and_comments() {
        let parsed = parse_dotenv("# comment\nBOT_TOKEN=\"abc\"\n\nTARGET_GROUP_ID = '@g'\nnoise\n");
        assert_eq!(
            parsed,
            vec![
                ("BOT_TOKEN".to_string(), "abc".to_string()),
                ("TARGET_GROUP_ID".to_string(), "@g".to_string()),
            ]
        );
    }
}
