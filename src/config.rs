use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<String>,
}

pub(crate) fn load_config(
    url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
) -> Result<ClientConfig> {
    resolve(
        url,
        user_agent,
        timeout,
        |name| std::env::var(name).ok(),
        &rc_candidates(),
    )
}

fn resolve(
    url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    env: impl Fn(&str) -> Option<String>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    let mut url = url.or_else(|| env("REDFIN_URL"));
    let mut user_agent = user_agent.or_else(|| env("REDFIN_USER_AGENT"));
    let mut timeout_text = if timeout.is_none() {
        env("REDFIN_TIMEOUT")
    } else {
        None
    };

    if url.is_none() || user_agent.is_none() || (timeout.is_none() && timeout_text.is_none()) {
        for rc_path in rc_candidates {
            if rc_path.exists() {
                let cfg = read_rc(rc_path).with_context(|| {
                    format!("failed to read configuration file {}", rc_path.display())
                })?;

                url = url.or(cfg.url);
                user_agent = user_agent.or(cfg.user_agent);
                if timeout.is_none() {
                    timeout_text = timeout_text.or(cfg.timeout);
                }
                break;
            }
        }
    }

    let timeout = match (timeout, timeout_text) {
        (Some(t), _) => Some(t),
        (None, Some(text)) => Some(parse_timeout(&text)?),
        (None, None) => None,
    };

    let mut cfg = ClientConfig::default();
    if let Some(url) = url {
        cfg = cfg.with_url(url);
    }
    if let Some(ua) = user_agent {
        cfg = cfg.with_user_agent(ua);
    }
    if let Some(t) = timeout {
        cfg = cfg.with_timeout(t);
    }
    Ok(cfg)
}

fn parse_timeout(text: &str) -> Result<Duration> {
    let secs: f64 = text
        .trim()
        .parse()
        .with_context(|| format!("invalid timeout `{text}` (expected seconds, e.g. 30)"))?;
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid timeout `{text}` (expected seconds, e.g. 30)"))
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // A key may be left empty with its value on the following line.
    let mut pending_key: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            // A user-agent contains colons itself, so only a `key:` shape ends the continuation.
            if !looks_like_key(line) {
                cfg.set(&pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim().to_ascii_lowercase().replace('_', "-");
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                cfg.set(&k, v);
            }
        }
    }

    cfg
}

impl RcConfig {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "url" => self.url = Some(value.to_string()),
            "user-agent" => self.user_agent = Some(value.to_string()),
            "timeout" => self.timeout = Some(value.to_string()),
            _ => {}
        }
    }
}

fn looks_like_key(line: &str) -> bool {
    line.split_once(':').is_some_and(|(k, _)| {
        let k = k.trim();
        !k.is_empty() && k.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !line.contains("://")
    })
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) REDFIN_RC (explicit)
    // 2) ./.redfinrc
    // 3) ~/.redfinrc
    if let Ok(p) = std::env::var("REDFIN_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".redfinrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".redfinrc"));
    }
    v
}
