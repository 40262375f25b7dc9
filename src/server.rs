//! HTTP boundary for inbound trade signals.
//!
//! Parses webhook payloads into normalized signals, hands them to the order
//! relay, and translates every outcome into a structured JSON response.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::BridgeError;
use crate::tradovate::{OrderOutcome, OrderRelay};

/// Shared state for all request handlers.
pub struct AppState {
    pub relay: RelayState,
}

/// The relay is constructed once at startup. Missing configuration keeps the
/// process serving (the liveness route stays useful on a half-configured
/// deployment) while every trading request reports what is missing.
pub enum RelayState {
    Ready(OrderRelay),
    Unconfigured(Vec<String>),
}

impl AppState {
    fn relay(&self) -> Result<&OrderRelay, BridgeError> {
        match &self.relay {
            RelayState::Ready(relay) => Ok(relay),
            RelayState::Unconfigured(missing) => Err(BridgeError::Config {
                missing: missing.clone(),
            }),
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook))
        .route("/accounts", get(accounts))
        .with_state(state)
}

/// Inbound signal shape posted by the alerting tool.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    /// Contracts to trade; alert payloads that omit it mean one contract.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// GET / - liveness marker
async fn health() -> &'static str {
    "tv-bridge running"
}

/// POST /webhook - receive a trade signal and relay it as a market order
async fn webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Response {
    let Json(signal) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return BridgeError::Validation(rejection.body_text()).into_response();
        }
    };
    info!(?signal, "Received signal");

    let relay = match state.relay() {
        Ok(relay) => relay,
        Err(err) => return err.into_response(),
    };

    let ticker = signal.ticker.as_deref().unwrap_or_default();
    let action = signal.action.as_deref().unwrap_or_default();

    match relay.submit(ticker, action, signal.quantity).await {
        Ok(result) if result.outcome == OrderOutcome::Accepted => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "tradovate": result.body })),
        )
            .into_response(),
        Ok(result) => {
            error!(
                "Order not accepted (status {}): {}",
                result.status, result.body
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "status": "error",
                    "tradovate_status": result.status,
                    "tradovate": result.body,
                })),
            )
                .into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// GET /accounts - pass through the brokerage's account listing
async fn accounts(State(state): State<Arc<AppState>>) -> Response {
    let relay = match state.relay() {
        Ok(relay) => relay,
        Err(err) => return err.into_response(),
    };

    match relay.list_accounts().await {
        Ok((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(body)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::Validation(_) | BridgeError::Resolution(_) => StatusCode::BAD_REQUEST,
            BridgeError::Auth { .. } | BridgeError::Broker { .. } | BridgeError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        if status.is_server_error() {
            error!("{self}");
        } else {
            info!("Rejected request: {self}");
        }

        let body = match &self {
            BridgeError::Broker { status, body } => json!({
                "status": "error",
                "tradovate_status": status,
                "tradovate": body,
            }),
            other => json!({ "status": "error", "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
