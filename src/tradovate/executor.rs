//! Signal-to-Order Relay
//!
//! Validates an inbound trade signal, resolves the tradable contract, and
//! submits a market order with exactly one forced re-authentication when the
//! brokerage reports an expired session.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::client::TradovateClient;
use super::models::{OrderAction, OrderType, PlaceOrderRequest, TimeInForce};
use crate::config::Settings;
use crate::error::BridgeError;

/// Response-body text that marks a dead session even when the status code
/// is not 401.
const EXPIRED_SESSION_MARKER: &str = "expired";

/// Transport-level classification of the brokerage's final answer.
///
/// A 2xx is `Accepted` even when the body embeds a business-level rejection;
/// callers inspect the body themselves, since the brokerage may answer
/// HTTP 200 with a rejection reason inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    Accepted,
    Rejected,
    TransientAuthFailure,
    Error,
}

/// The brokerage's verdict on one order submission.
#[derive(Debug, Clone)]
pub struct OrderResult {
    pub status: u16,
    pub body: Value,
    pub outcome: OrderOutcome,
}

/// Relays normalized webhook signals to the brokerage as market orders.
pub struct OrderRelay {
    client: TradovateClient,
    account_id: i64,
    account_spec: Option<String>,
    symbol_map: HashMap<String, String>,
}

impl OrderRelay {
    /// Create a relay from loaded settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: TradovateClient::new(settings),
            account_id: settings.credentials.account_id,
            account_spec: settings.credentials.account_spec.clone(),
            symbol_map: settings.symbol_map.clone(),
        }
    }

    /// Validate a signal, resolve its contract, and submit a market order.
    ///
    /// Retry policy: an unauthorized first answer triggers exactly one forced
    /// re-authentication and one resubmission of the identical payload. A
    /// second failure of any kind is returned as-is; nothing else is retried,
    /// so a flaky network can never multiply a fill.
    pub async fn submit(
        &self,
        ticker: &str,
        action: &str,
        quantity: i32,
    ) -> Result<OrderResult, BridgeError> {
        let action = OrderAction::from_signal(action)
            .ok_or_else(|| BridgeError::Validation("action must be buy/sell".to_string()))?;
        if ticker.trim().is_empty() {
            return Err(BridgeError::Validation("missing ticker".to_string()));
        }
        if quantity <= 0 {
            return Err(BridgeError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let root = self
            .symbol_map
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| ticker.to_string());
        let contract = self.client.resolve_contract(&root).await?;
        info!(
            "Resolved {} -> {} (contract ID {})",
            ticker, contract.name, contract.id
        );

        let request = PlaceOrderRequest {
            account_spec: self.account_spec.clone(),
            account_id: self.account_id,
            action,
            symbol: contract.name,
            order_qty: quantity,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            is_automated: true,
            custom_tag_50: Some(Uuid::new_v4().to_string()),
        };

        let token = self.client.access_token(false).await?;
        let (status, body) = self.client.place_order(&token, &request).await?;
        let mut result = OrderResult {
            outcome: classify(status, &body),
            status,
            body,
        };

        if result.outcome == OrderOutcome::TransientAuthFailure {
            warn!(
                "Session rejected mid-order (status {}), re-authenticating once",
                result.status
            );
            let token = self.client.access_token(true).await?;
            let (status, body) = self.client.place_order(&token, &request).await?;
            result = OrderResult {
                outcome: classify(status, &body),
                status,
                body,
            };
        }

        match result.outcome {
            OrderOutcome::Accepted => info!("Order accepted (status {})", result.status),
            _ => warn!("Order not accepted (status {}): {}", result.status, result.body),
        }
        Ok(result)
    }

    /// Pass through the brokerage's account listing (diagnostics).
    pub async fn list_accounts(&self) -> Result<(u16, Value), BridgeError> {
        self.client.list_accounts().await
    }
}

/// Classify a brokerage answer for the retry policy and the HTTP boundary.
fn classify(status: u16, body: &Value) -> OrderOutcome {
    if (200..300).contains(&status) {
        return OrderOutcome::Accepted;
    }
    if status == 401 {
        return OrderOutcome::TransientAuthFailure;
    }
    if body
        .to_string()
        .to_ascii_lowercase()
        .contains(EXPIRED_SESSION_MARKER)
    {
        return OrderOutcome::TransientAuthFailure;
    }
    if (400..500).contains(&status) {
        OrderOutcome::Rejected
    } else {
        OrderOutcome::Error
    }
}
