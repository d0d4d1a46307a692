//! Deposit endpoint: one TCP connection per deposit.
//!
//! Per connection: `AwaitName -> AwaitAmount -> Respond -> Closed`. Both fields
//! are read before anything is validated, the ledger is touched only after the
//! network reads are done, and the reply is written after the lock is gone.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::protocol::{self, Outcome, MAX_LINE};
use crate::server::ServeError;
use crate::services::AppServices;

#[derive(Debug, Error)]
enum ReadError {
    #[error("connection closed by peer")]
    Closed,

    #[error(transparent)]
    Codec(#[from] LinesCodecError),
}

enum DepositState {
    AwaitName,
    AwaitAmount { name: String },
    Respond(Outcome),
    Closed,
}

pub struct DepositServer {
    listener: TcpListener,
    services: AppServices,
}

impl DepositServer {
    pub async fn bind(addr: &str, services: AppServices) -> Result<Self, ServeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::bind("deposit", addr, source))?;
        Ok(Self { listener, services })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` fires. Each connection gets its own task.
    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(%addr, "deposit server listening");
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    let services = self.services.clone();
                    tokio::spawn(handle_connection(stream, peer, services));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "deposit accept failed");
                }
            }
        }

        tracing::info!("deposit server stopped");
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, services: AppServices) {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE));
    let mut state = DepositState::AwaitName;

    loop {
        state = match state {
            DepositState::AwaitName => match next_line(&mut framed).await {
                Ok(name) => DepositState::AwaitAmount { name },
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "error reading username");
                    DepositState::Respond(Outcome::rejected("Error reading username"))
                }
            },
            DepositState::AwaitAmount { name } => match next_line(&mut framed).await {
                Ok(amount) => DepositState::Respond(process_deposit(&services, &name, &amount)),
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "error reading amount");
                    DepositState::Respond(Outcome::rejected("Error reading amount"))
                }
            },
            DepositState::Respond(outcome) => {
                if let Err(e) = framed.send(outcome.reply).await {
                    tracing::warn!(%peer, error = %e, "failed to write deposit reply");
                }
                if let Some(snapshot) = outcome.snapshot {
                    services.publish(snapshot);
                }
                DepositState::Closed
            }
            DepositState::Closed => break,
        };
    }
}

async fn next_line(framed: &mut Framed<TcpStream, LinesCodec>) -> Result<String, ReadError> {
    match framed.next().await {
        Some(line) => Ok(line?),
        None => Err(ReadError::Closed),
    }
}

/// Validate and apply one deposit.
pub fn process_deposit(services: &AppServices, name: &str, raw_amount: &str) -> Outcome {
    let request = match protocol::parse_fields(name, raw_amount) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(account = name.trim(), amount = raw_amount.trim(), "deposit rejected: {e}");
            return Outcome::rejected(e.to_string());
        }
    };

    match services.ledger().credit(&request.name, request.amount) {
        Ok(commit) => {
            tracing::info!(
                account = %request.name,
                amount = request.amount,
                balance = commit.value,
                "deposit committed"
            );
            Outcome::committed(
                protocol::balance_reply(&request.name, commit.value),
                commit.snapshot,
            )
        }
        Err(err) => {
            tracing::warn!(account = %request.name, amount = request.amount, "deposit rejected: {err}");
            Outcome::rejected(protocol::ledger_error_message(&err))
        }
    }
}
