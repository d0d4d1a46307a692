//! Donation ledger server: deposit (TCP), withdrawal (UDP) and control plane
//! (HTTP) over one shared ledger, with live snapshots pushed over WebSocket.

pub mod app;
pub mod config;
pub mod deposit;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod services;
pub mod withdrawal;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ServerConfig};
pub use server::{ServeError, Server};
pub use services::AppServices;
