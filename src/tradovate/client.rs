//! Tradovate API Client
//!
//! HTTP client for the Tradovate REST API with cached token-based
//! authentication.

use std::time::Instant;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::auth::{expiry_from_response, SessionToken, TokenCache};
use super::models::*;
use crate::config::{Credentials, Settings};
use crate::error::{truncate, BridgeError};

/// Demo environment base URL
pub const DEMO_BASE_URL: &str = "https://demo.tradovateapi.com/v1";

/// Live environment base URL
pub const LIVE_BASE_URL: &str = "https://live.tradovateapi.com/v1";

/// Application identity sent with every login request
const APP_ID: &str = "tv-bridge";
const APP_VERSION: &str = "1.0";

/// Tradovate API client with a shared, lock-guarded token cache
pub struct TradovateClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    device_id: Option<String>,
    cache: TokenCache,
}

impl TradovateClient {
    /// Create a new client from loaded settings
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: Client::builder()
                .timeout(settings.http_timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials: settings.credentials.clone(),
            device_id: settings.device_id.clone(),
            cache: TokenCache::new(),
        }
    }

    /// Get a usable session token, logging in only when needed.
    ///
    /// With `force_refresh` the cached token is discarded and a fresh login
    /// is issued regardless of remaining lifetime. The whole check-and-refresh
    /// sequence holds the cache lock, so concurrent callers that race an
    /// expired token produce a single login call.
    pub async fn access_token(&self, force_refresh: bool) -> Result<String, BridgeError> {
        let mut cached = self.cache.lock().await;
        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                if token.is_usable(Instant::now()) {
                    return Ok(token.value.clone());
                }
            }
        }
        let token = self.login().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Authenticate with the API and obtain an access token
    async fn login(&self) -> Result<SessionToken, BridgeError> {
        info!("Authenticating with Tradovate at {}...", self.base_url);

        let request = AuthRequest {
            name: self.credentials.username.clone(),
            password: self.credentials.password.clone(),
            app_id: APP_ID.to_string(),
            app_version: APP_VERSION.to_string(),
            cid: self.credentials.cid,
            sec: self.credentials.sec.clone(),
            device_id: self.device_id.clone(),
        };

        let response = self
            .http
            .post(format!("{}/auth/accesstokenrequest", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let issued_at = Instant::now();

        if !status.is_success() {
            return Err(BridgeError::Auth {
                status: status.as_u16(),
                detail: truncate(&body, 500),
            });
        }

        let parsed: AuthResponse = serde_json::from_str(&body).map_err(|_| BridgeError::Auth {
            status: status.as_u16(),
            detail: format!("unparseable login response: {}", truncate(&body, 200)),
        })?;

        if let Some(error_text) = parsed.error_text {
            return Err(BridgeError::Auth {
                status: status.as_u16(),
                detail: error_text,
            });
        }
        if parsed.p_ticket.is_some() {
            return Err(BridgeError::Auth {
                status: status.as_u16(),
                detail: "additional verification required (p-ticket); complete it through the \
                         Tradovate web interface first"
                    .to_string(),
            });
        }

        let value = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BridgeError::Auth {
                status: status.as_u16(),
                detail: "no access token in response".to_string(),
            })?;

        let expires_at = expiry_from_response(parsed.expiration_time.as_deref(), issued_at);
        info!(
            "Authenticated; token usable for {:?}",
            expires_at.saturating_duration_since(issued_at)
        );

        Ok(SessionToken {
            value,
            issued_at,
            expires_at,
        })
    }

    /// Resolve a root symbol to the contract the relay should trade.
    ///
    /// Queries the contract-search endpoint and applies the front-month
    /// selection policy; the result is per-order and never cached (front-month
    /// rollover makes a long-lived cache unsafe without invalidation).
    pub async fn resolve_contract(&self, root: &str) -> Result<Contract, BridgeError> {
        let contracts = self.suggest_contracts(root).await?;
        select_contract(&contracts)
            .cloned()
            .ok_or_else(|| BridgeError::Resolution(root.to_string()))
    }

    /// Query candidate contracts for a root symbol
    async fn suggest_contracts(&self, root: &str) -> Result<Vec<Contract>, BridgeError> {
        let token = self.access_token(false).await?;
        debug!("Searching contracts for {root}");

        let response = self
            .http
            .get(format!("{}/contract/suggest", self.base_url))
            .query(&[("t", root)])
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BridgeError::Broker {
                status: status.as_u16(),
                body: into_json(&body),
            });
        }

        // A non-list payload means nothing tradable, same as an empty list.
        let contracts: Vec<Contract> =
            serde_json::from_str(&body).map_err(|_| BridgeError::Resolution(root.to_string()))?;
        debug!("Found {} contracts for {root}", contracts.len());
        Ok(contracts)
    }

    /// Submit an order and return the brokerage's raw verdict.
    ///
    /// Classification and the retry-on-expiry policy live in the executor;
    /// this method reports whatever the brokerage answered.
    pub async fn place_order(
        &self,
        token: &str,
        request: &PlaceOrderRequest,
    ) -> Result<(u16, Value), BridgeError> {
        info!(
            "Placing order: {} {} {} @ MKT",
            request.action, request.order_qty, request.symbol
        );

        let response = self
            .http
            .post(format!("{}/order/placeorder", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!("Order response {}: {}", status, truncate(&body, 500));

        Ok((status, into_json(&body)))
    }

    /// List the accounts visible to these credentials (diagnostics)
    pub async fn list_accounts(&self) -> Result<(u16, Value), BridgeError> {
        let token = self.access_token(false).await?;
        debug!("Fetching accounts...");

        let response = self
            .http
            .get(format!("{}/account/list", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok((status, into_json(&body)))
    }
}

/// Front-month selection policy, first match wins:
/// front-month flag, then active flag, then the first element.
///
/// This is a heuristic tie-break, not a guarantee: the brokerage has no
/// single authoritative "current contract" field across instrument types.
/// Replace with exchange-calendar logic if the heuristic misfires.
pub fn select_contract(contracts: &[Contract]) -> Option<&Contract> {
    contracts
        .iter()
        .find(|c| c.is_front)
        .or_else(|| contracts.iter().find(|c| c.active))
        .or_else(|| contracts.first())
}

/// Keep non-JSON bodies intact for diagnostics instead of discarding them
fn into_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(id: i64, name: &str, is_front: bool, active: bool) -> Contract {
        Contract {
            id,
            name: name.to_string(),
            is_front,
            active,
        }
    }

    #[test]
    fn front_month_flag_wins_regardless_of_position() {
        let contracts = vec![
            contract(1, "MNQU5", false, true),
            contract(2, "MNQH6", false, true),
            contract(3, "MNQZ5", true, true),
        ];
        assert_eq!(select_contract(&contracts).unwrap().name, "MNQZ5");
    }

    #[test]
    fn active_flag_breaks_ties_without_front_month() {
        let contracts = vec![
            contract(1, "MNQU5", false, false),
            contract(2, "MNQZ5", false, true),
        ];
        assert_eq!(select_contract(&contracts).unwrap().name, "MNQZ5");
    }

    #[test]
    fn unflagged_set_selects_first_element() {
        let contracts = vec![
            contract(1, "MNQU5", false, false),
            contract(2, "MNQZ5", false, false),
        ];
        assert_eq!(select_contract(&contracts).unwrap().name, "MNQU5");
    }

    #[test]
    fn empty_set_selects_nothing() {
        assert!(select_contract(&[]).is_none());
    }

    #[test]
    fn non_json_bodies_survive_as_strings() {
        assert_eq!(into_json("Access is denied"), Value::String("Access is denied".into()));
        assert_eq!(into_json(r#"{"orderId":123}"#)["orderId"], 123);
    }
}
