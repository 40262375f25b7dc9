// Library crate - exports the webhook relay components

pub mod config;
pub mod error;
pub mod server;
pub mod tradovate;

// Re-export commonly used types
pub use config::Settings;
pub use error::BridgeError;
pub use server::{router, AppState, RelayState};
