//! Tradovate API Data Models
//!
//! Request and response types for the Tradovate REST API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication
// ============================================================================

/// Request body for authentication via access token request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Account username
    pub name: String,
    /// Account password
    pub password: String,
    /// Application identifier
    pub app_id: String,
    /// Application version
    pub app_version: String,
    /// Client ID from API access settings
    pub cid: i32,
    /// Client secret from API access settings
    pub sec: String,
    /// Device ID (unique identifier for this device)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// Response from the authentication endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Access token for API calls
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token expiry; ISO-8601 on the live API, other shapes observed in
    /// the wild are handled in `auth::expiry_from_response`
    #[serde(default)]
    pub expiration_time: Option<String>,
    /// Error text if authentication failed
    #[serde(default)]
    pub error_text: Option<String>,
    /// P-Ticket for additional security challenges
    #[serde(rename = "p-ticket", default)]
    pub p_ticket: Option<String>,
}

// ============================================================================
// Contracts
// ============================================================================

/// Candidate contract returned by the contract-search endpoint
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Contract ID
    pub id: i64,
    /// Contract name/symbol (e.g., "MNQZ5")
    pub name: String,
    /// Front-month flag; not every instrument type carries it
    #[serde(default)]
    pub is_front: bool,
    /// Whether the contract is currently tradable
    #[serde(default)]
    pub active: bool,
}

// ============================================================================
// Orders
// ============================================================================

/// Order action (Buy or Sell)
///
/// Direction is always carried here, never by the sign of the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    /// Parse the inbound webhook encoding ("buy"/"sell", any casing).
    pub fn from_signal(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(OrderAction::Buy),
            "sell" => Some(OrderAction::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "Buy"),
            OrderAction::Sell => write!(f, "Sell"),
        }
    }
}

/// Order type; the relay only ever submits market orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "Market"),
        }
    }
}

/// Time in force for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    Day,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeInForce::Day => write!(f, "Day"),
        }
    }
}

/// Request to place an order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Account spec (account name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_spec: Option<String>,
    /// Account ID
    pub account_id: i64,
    /// Buy or Sell
    pub action: OrderAction,
    /// Contract symbol (e.g., "MNQZ5")
    pub symbol: String,
    /// Quantity (number of contracts, always positive)
    pub order_qty: i32,
    /// Order type
    pub order_type: OrderType,
    /// Time in force
    pub time_in_force: TimeInForce,
    /// REQUIRED for CME compliance - must be true for automated trading
    pub is_automated: bool,
    /// Client-generated unique order tag; lets the brokerage deduplicate a
    /// resubmission if a layer above the relay retries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tag_50: Option<String>,
}
