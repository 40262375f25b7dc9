//! Environment-driven configuration.
//!
//! All credentials come from `TD_*` environment variables (or a `.env` file
//! via dotenvy) and are read once at startup. Missing required variables are
//! collected and reported together rather than one at a time.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::BridgeError;
use crate::tradovate::client::{DEMO_BASE_URL, LIVE_BASE_URL};

/// Default per-call timeout for brokerage requests.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Brokerage login identity and trading account, immutable after startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account username (`TD_USERNAME`)
    pub username: String,
    /// Account password (`TD_PASSWORD`)
    pub password: String,
    /// Client ID from API access settings (`TD_CID`)
    pub cid: i32,
    /// Client secret from API access settings (`TD_SEC`)
    pub sec: String,
    /// Trading account ID for order placement (`TD_ACCOUNT_ID`)
    pub account_id: i64,
    /// Account spec/name; some order routes want it alongside the ID
    /// (`TD_ACCOUNT_SPEC`)
    pub account_spec: Option<String>,
}

/// Service configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    /// Brokerage API base URL; defaults to the live environment, `TD_LIVE=false`
    /// selects demo, `TD_BASE_URL` overrides both.
    pub base_url: String,
    /// Per-call timeout for login, contract search, and order placement.
    pub http_timeout: Duration,
    /// Unique device identifier sent with login requests (`TD_DEVICE_ID`)
    pub device_id: Option<String>,
    /// Inbound ticker -> brokerage root symbol, e.g. `{"MNQ1!": "MNQ"}`
    /// (`TD_SYMBOL_MAP`, JSON object)
    pub symbol_map: HashMap<String, String>,
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let mut missing = Vec::new();
        let mut require = |name: &str| match get(name).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let username = require("TD_USERNAME");
        let password = require("TD_PASSWORD");
        let cid_raw = require("TD_CID");
        let sec = require("TD_SEC");
        let account_raw = require("TD_ACCOUNT_ID");

        let cid = match cid_raw.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                if !cid_raw.is_empty() {
                    missing.push("TD_CID (must be an integer)".to_string());
                }
                0
            }
        };
        let account_id = match account_raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                if !account_raw.is_empty() {
                    missing.push("TD_ACCOUNT_ID (must be an integer)".to_string());
                }
                0
            }
        };

        let account_spec = get("TD_ACCOUNT_SPEC").filter(|v| !v.is_empty());
        let device_id = get("TD_DEVICE_ID").filter(|v| !v.is_empty());

        let base_url = get("TD_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                let live = get("TD_LIVE")
                    .map(|v| v.to_ascii_lowercase() != "false")
                    .unwrap_or(true);
                if live { LIVE_BASE_URL } else { DEMO_BASE_URL }.to_string()
            });

        let http_timeout = match get("TD_HTTP_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    missing.push("TD_HTTP_TIMEOUT_SECS (must be an integer)".to_string());
                    DEFAULT_HTTP_TIMEOUT
                }
            },
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let symbol_map = match get("TD_SYMBOL_MAP").filter(|v| !v.is_empty()) {
            Some(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(_) => {
                    missing.push("TD_SYMBOL_MAP (must be a JSON object of strings)".to_string());
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        if !missing.is_empty() {
            return Err(BridgeError::Config { missing });
        }

        Ok(Self {
            credentials: Credentials {
                username,
                password,
                cid,
                sec,
                account_id,
                account_spec,
            },
            base_url,
            http_timeout,
            device_id,
            symbol_map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    const FULL: &[(&str, &str)] = &[
        ("TD_USERNAME", "trader"),
        ("TD_PASSWORD", "hunter2"),
        ("TD_CID", "42"),
        ("TD_SEC", "secret"),
        ("TD_ACCOUNT_ID", "861089"),
        ("TD_ACCOUNT_SPEC", "DEMO123"),
    ];

    #[test]
    fn loads_complete_settings() {
        let settings = Settings::from_lookup(lookup(FULL)).unwrap();
        assert_eq!(settings.credentials.username, "trader");
        assert_eq!(settings.credentials.cid, 42);
        assert_eq!(settings.credentials.account_id, 861089);
        assert_eq!(settings.credentials.account_spec.as_deref(), Some("DEMO123"));
        assert_eq!(settings.base_url, LIVE_BASE_URL);
        assert_eq!(settings.http_timeout, Duration::from_secs(15));
        assert!(settings.symbol_map.is_empty());
    }

    #[test]
    fn collects_every_missing_variable() {
        let err = Settings::from_lookup(lookup(&[("TD_USERNAME", "trader")])).unwrap_err();
        match err {
            BridgeError::Config { missing } => {
                assert_eq!(
                    missing,
                    vec!["TD_PASSWORD", "TD_CID", "TD_SEC", "TD_ACCOUNT_ID"]
                );
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut vars = FULL.to_vec();
        vars[1] = ("TD_PASSWORD", "");
        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        match err {
            BridgeError::Config { missing } => assert_eq!(missing, vec!["TD_PASSWORD"]),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn non_integer_cid_is_a_config_error() {
        let mut vars = FULL.to_vec();
        vars[2] = ("TD_CID", "not-a-number");
        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        match err {
            BridgeError::Config { missing } => {
                assert_eq!(missing, vec!["TD_CID (must be an integer)"]);
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn td_live_false_targets_demo() {
        let mut vars = FULL.to_vec();
        vars.push(("TD_LIVE", "false"));
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.base_url, DEMO_BASE_URL);
    }

    #[test]
    fn explicit_base_url_wins() {
        let mut vars = FULL.to_vec();
        vars.push(("TD_LIVE", "false"));
        vars.push(("TD_BASE_URL", "http://localhost:9999"));
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.base_url, "http://localhost:9999");
    }

    #[test]
    fn parses_symbol_map_json() {
        let mut vars = FULL.to_vec();
        vars.push(("TD_SYMBOL_MAP", r#"{"MNQ1!":"MNQ","NQ1!":"NQ"}"#));
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.symbol_map["MNQ1!"], "MNQ");
        assert_eq!(settings.symbol_map.len(), 2);
    }

    #[test]
    fn malformed_symbol_map_is_a_config_error() {
        let mut vars = FULL.to_vec();
        vars.push(("TD_SYMBOL_MAP", "MNQ=MNQZ5"));
        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        match err {
            BridgeError::Config { missing } => {
                assert_eq!(missing, vec!["TD_SYMBOL_MAP (must be a JSON object of strings)"]);
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn custom_timeout_is_applied() {
        let mut vars = FULL.to_vec();
        vars.push(("TD_HTTP_TIMEOUT_SECS", "20"));
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.http_timeout, Duration::from_secs(20));
    }
}
