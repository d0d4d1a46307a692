//! Withdrawal endpoint: one UDP datagram per withdrawal, one datagram back.
//!
//! Datagrams are independent requests. A duplicate simply debits again; there
//! is no request id and no deduplication.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::protocol::{self, Outcome, MAX_DATAGRAM};
use crate::server::ServeError;
use crate::services::AppServices;

pub struct WithdrawalServer {
    socket: Arc<UdpSocket>,
    services: AppServices,
}

impl WithdrawalServer {
    pub async fn bind(addr: &str, services: AppServices) -> Result<Self, ServeError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServeError::bind("withdrawal", addr, source))?;
        Ok(Self {
            socket: Arc::new(socket),
            services,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams until `shutdown` fires. Each datagram gets its own task.
    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(%addr, "withdrawal server listening");
        }

        loop {
            // One spare byte so an over-long datagram is seen as such, not truncated.
            let mut buf = vec![0u8; MAX_DATAGRAM + 1];
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => received,
            };

            match received {
                Ok((len, peer)) => {
                    buf.truncate(len);
                    let socket = self.socket.clone();
                    let services = self.services.clone();
                    tokio::spawn(async move {
                        handle_datagram(&socket, &services, &buf, peer).await;
                    });
                }
                Err(e) => {
                    // ICMP errors from earlier replies surface here on some platforms.
                    tracing::warn!(error = %e, "withdrawal receive failed");
                }
            }
        }

        tracing::info!("withdrawal server stopped");
    }
}

async fn handle_datagram(socket: &UdpSocket, services: &AppServices, payload: &[u8], peer: SocketAddr) {
    let outcome = process_withdrawal(services, payload);

    let reply = format!("{}\n", outcome.reply);
    if let Err(e) = socket.send_to(reply.as_bytes(), peer).await {
        tracing::warn!(%peer, error = %e, "failed to send withdrawal reply");
    }
    if let Some(snapshot) = outcome.snapshot {
        services.publish(snapshot);
    }
}

/// Validate and apply one withdrawal datagram.
pub fn process_withdrawal(services: &AppServices, payload: &[u8]) -> Outcome {
    let request = match protocol::parse_datagram(payload) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(len = payload.len(), "withdrawal rejected: {e}");
            return Outcome::rejected(e.to_string());
        }
    };

    match services.ledger().debit(&request.name, request.amount) {
        Ok(commit) => {
            tracing::info!(
                account = %request.name,
                amount = request.amount,
                balance = commit.value,
                "withdrawal committed"
            );
            Outcome::committed(
                protocol::balance_reply(&request.name, commit.value),
                commit.snapshot,
            )
        }
        Err(err) => {
            tracing::warn!(account = %request.name, amount = request.amount, "withdrawal rejected: {err}");
            Outcome::rejected(protocol::ledger_error_message(&err))
        }
    }
}
