//! Error taxonomy for the relay.
//!
//! Every failure that can reach the HTTP caller is a [`BridgeError`]; the
//! server layer maps each variant onto a status code and a structured JSON
//! body (see `server.rs`). No variant is retried more than once anywhere in
//! the stack.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Required configuration absent or unusable; the request never leaves
    /// the process.
    #[error("missing or invalid environment variables: {}", .missing.join(", "))]
    Config { missing: Vec<String> },

    /// Malformed inbound signal; rejected before any brokerage call.
    #[error("{0}")]
    Validation(String),

    /// Login call failed or returned no usable token.
    #[error("authentication failed ({status}): {detail}")]
    Auth { status: u16, detail: String },

    /// Contract search produced nothing tradable for the root symbol.
    #[error("no contracts found for '{0}'")]
    Resolution(String),

    /// The brokerage answered an authenticated call with an error status.
    #[error("brokerage call failed ({status})")]
    Broker { status: u16, body: serde_json::Value },

    /// Timeout or connection failure talking to the brokerage.
    #[error("brokerage request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Clip a response body for logs and error detail.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_clips_long_bodies() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé...");
    }

    #[test]
    fn config_error_lists_every_missing_variable() {
        let err = BridgeError::Config {
            missing: vec!["TD_USERNAME".to_string(), "TD_SEC".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing or invalid environment variables: TD_USERNAME, TD_SEC"
        );
    }
}
