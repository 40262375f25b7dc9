//! Tradovate API Integration
//!
//! REST integration with the Tradovate brokerage: cached session-token
//! authentication, front-month contract resolution, and market order
//! placement for inbound webhook signals.
//!
//! # Components
//!
//! - [`auth`] - session token cache and expiry handling
//! - [`client`] - HTTP client for the brokerage endpoints
//! - [`models`] - request/response data types
//! - [`executor`] - signal validation and order submission with one-shot
//!   retry on session expiry
//!
//! # Environment Variables
//!
//! - `TD_USERNAME` - Tradovate username
//! - `TD_PASSWORD` - Tradovate password
//! - `TD_CID` - Client ID from API settings
//! - `TD_SEC` - Client secret from API settings
//! - `TD_ACCOUNT_ID` - Trading account ID
//! - `TD_ACCOUNT_SPEC` (optional) - Account spec/name
//! - `TD_DEVICE_ID` (optional) - Unique device identifier
//! - `TD_LIVE` (optional) - Set to "false" for the demo environment
//!
//! # API Endpoints Used
//!
//! - `POST /auth/accesstokenrequest` - Authentication
//! - `GET /contract/suggest?t=...` - Contract search
//! - `POST /order/placeorder` - Order placement
//! - `GET /account/list` - Account listing (diagnostics)

pub mod auth;
pub mod client;
pub mod executor;
pub mod models;

// Re-export commonly used types
pub use client::TradovateClient;
pub use executor::{OrderOutcome, OrderRelay, OrderResult};
pub use models::{Contract, OrderAction};
