use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use tv_bridge::config::Settings;
use tv_bridge::server::{router, AppState, RelayState};
use tv_bridge::tradovate::OrderRelay;
use tv_bridge::BridgeError;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port to run the webhook server on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tv_bridge=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let relay = match Settings::from_env() {
        Ok(settings) => {
            info!("Starting tv-bridge against {}", settings.base_url);
            RelayState::Ready(OrderRelay::new(&settings))
        }
        Err(BridgeError::Config { missing }) => {
            // Keep serving; trading requests report the missing variables
            // until they are set.
            error!("Missing configuration: {}", missing.join(", "));
            RelayState::Unconfigured(missing)
        }
        Err(other) => return Err(other.into()),
    };

    let state = Arc::new(AppState { relay });
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
