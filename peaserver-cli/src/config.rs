//! Load config from file and environment.

use serde::Deserialize;
use std::path::PathBuf;

/// CLI configuration. File: ~/.config/peaserver/config.toml or
/// /etc/peaserver/config.toml.
/// Env overrides: PEASERVER_ADDRESS, PEASERVER_TIMEOUT_SECS.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server address: host:port for framed TCP, or an http(s) URL.
    #[serde(default)]
    pub address: Option<String>,
    /// Per-request timeout in seconds (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load config: merge default, then config file (if present), then env vars.
pub fn load() -> Config {
    let mut c = load_file().unwrap_or_else(Config::default);
    if let Ok(s) = std::env::var("PEASERVER_ADDRESS") {
        if !s.is_empty() {
            c.address = Some(s);
        }
    }
    if let Ok(s) = std::env::var("PEASERVER_TIMEOUT_SECS") {
        if let Ok(t) = s.parse::<u64>() {
            c.timeout_secs = t;
        }
    }
    c
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/peaserver/config.toml"));
    }
    out.push(PathBuf::from("/etc/peaserver/config.toml"));
    out
}

fn load_file() -> Option<Config> {
    for p in config_paths() {
        if p.exists() {
            if let Ok(s) = std::fs::read_to_string(&p) {
                if let Ok(c) = toml::from_str::<Config>(&s) {
                    return Some(c);
                }
            }
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c.address, None);
        assert_eq!(c.timeout_secs, 30);
    }

    #[test]
    fn full_file_parses() {
        let c: Config =
            toml::from_str("address = \"10.0.0.5:9000\"\ntimeout_secs = 5\n").unwrap();
        assert_eq!(c.address.as_deref(), Some("10.0.0.5:9000"));
        assert_eq!(c.timeout_secs, 5);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("bogus = 1\n").is_err());
    }
}
