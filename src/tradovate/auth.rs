//! Session token cache and expiry handling.
//!
//! The brokerage issues short-lived bearer tokens; this module owns the one
//! process-wide cached token and decides when it is still safe to use.

use std::time::{Duration, Instant};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Buffer subtracted from a token's nominal expiry so a request never starts
/// with a token that could expire while in flight (also absorbs clock skew
/// against the brokerage's timestamps).
pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// TTL assumed when the login response omits or mangles the expiry field.
pub const FALLBACK_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

/// A session token issued by the brokerage login endpoint.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Opaque bearer value.
    pub value: String,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

impl SessionToken {
    /// Whether the token can still cover a request starting now.
    pub fn is_usable(&self, now: Instant) -> bool {
        now + TOKEN_SAFETY_MARGIN < self.expires_at
    }
}

/// Cache of the most recently issued session token, shared by all in-flight
/// requests.
///
/// The check-and-refresh sequence in `TradovateClient::access_token` runs
/// under a single lock acquisition, so two concurrent requests never issue
/// duplicate login calls and a reader never observes a half-updated
/// token/expiry pair.
#[derive(Debug, Default)]
pub struct TokenCache {
    inner: Mutex<Option<SessionToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the cache lock for a check-and-refresh sequence.
    pub async fn lock(&self) -> MutexGuard<'_, Option<SessionToken>> {
        self.inner.lock().await
    }
}

/// Compute the expiry instant for a freshly issued token.
///
/// The live API returns an ISO-8601 `expirationTime` (the shape observed at
/// integration time); other response shapes carry seconds-remaining or omit
/// the field, so anything unparseable falls back to a conservative fixed TTL.
/// An expiry already in the past yields a token that is expired immediately.
pub fn expiry_from_response(expiration_time: Option<&str>, issued_at: Instant) -> Instant {
    let Some(raw) = expiration_time else {
        debug!("login response carried no expiry, assuming {FALLBACK_TOKEN_TTL:?}");
        return issued_at + FALLBACK_TOKEN_TTL;
    };
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return match (timestamp.with_timezone(&chrono::Utc) - chrono::Utc::now()).to_std() {
            Ok(remaining) => issued_at + remaining,
            Err(_) => issued_at,
        };
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return issued_at + Duration::from_secs(secs);
    }
    debug!("unrecognized expiry shape {raw:?}, assuming {FALLBACK_TOKEN_TTL:?}");
    issued_at + FALLBACK_TOKEN_TTL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(lifetime: Duration) -> SessionToken {
        let now = Instant::now();
        SessionToken {
            value: "tok".to_string(),
            issued_at: now,
            expires_at: now + lifetime,
        }
    }

    #[test]
    fn token_is_usable_outside_safety_margin() {
        let token = token(Duration::from_secs(120));
        assert!(token.is_usable(token.issued_at));
        assert!(token.is_usable(token.issued_at + Duration::from_secs(80)));
    }

    #[test]
    fn token_is_unusable_inside_safety_margin() {
        let token = token(Duration::from_secs(120));
        assert!(!token.is_usable(token.issued_at + Duration::from_secs(91)));
        assert!(!token.is_usable(token.issued_at + Duration::from_secs(300)));
    }

    #[test]
    fn rfc3339_expiry_sets_remaining_lifetime() {
        let issued_at = Instant::now();
        let raw = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        let expires_at = expiry_from_response(Some(&raw), issued_at);
        let lifetime = expires_at - issued_at;
        assert!(lifetime > Duration::from_secs(55 * 60));
        assert!(lifetime <= Duration::from_secs(60 * 60));
    }

    #[test]
    fn past_rfc3339_expiry_is_already_expired() {
        let issued_at = Instant::now();
        let raw = (chrono::Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
        assert_eq!(expiry_from_response(Some(&raw), issued_at), issued_at);
    }

    #[test]
    fn seconds_remaining_expiry_is_added_to_issue_time() {
        let issued_at = Instant::now();
        let expires_at = expiry_from_response(Some("4800"), issued_at);
        assert_eq!(expires_at - issued_at, Duration::from_secs(4800));
    }

    #[test]
    fn absent_expiry_falls_back_to_fixed_ttl() {
        let issued_at = Instant::now();
        assert_eq!(
            expiry_from_response(None, issued_at) - issued_at,
            FALLBACK_TOKEN_TTL
        );
    }

    #[test]
    fn garbage_expiry_falls_back_to_fixed_ttl() {
        let issued_at = Instant::now();
        assert_eq!(
            expiry_from_response(Some("next tuesday"), issued_at) - issued_at,
            FALLBACK_TOKEN_TTL
        );
    }
}
