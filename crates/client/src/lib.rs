//! Client side of the deposit (TCP) and withdrawal (UDP) text protocols.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

pub mod cli;

pub const DEFAULT_DEPOSIT_ADDR: &str = "localhost:9000";
pub const DEFAULT_WITHDRAW_ADDR: &str = "localhost:9001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_REPLY: usize = 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not resolve {0}")]
    Resolve(String),

    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Whether a server reply reports a committed balance change.
pub fn is_success(reply: &str) -> bool {
    reply.contains("new balance")
}

/// Send one deposit over a fresh TCP connection and return the server's reply.
pub async fn deposit(addr: &str, name: &str, amount: &str) -> Result<String, ClientError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;

    stream
        .write_all(format!("{}\n{}\n", name.trim(), amount.trim()).as_bytes())
        .await?;

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await?;
    tracing::debug!(addr, bytes = reply.len(), "deposit reply received");

    Ok(String::from_utf8_lossy(&reply).trim_end().to_string())
}

/// Send one withdrawal datagram and wait up to `timeout` for the reply.
pub async fn withdraw(
    addr: &str,
    name: &str,
    amount: &str,
    timeout: Duration,
) -> Result<String, ClientError> {
    let target = resolve(addr).await?;
    let local: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(local).await?;
    socket
        .connect(target)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    socket
        .send(format!("{}\n{}\n", name.trim(), amount.trim()).as_bytes())
        .await?;

    let mut buf = [0u8; MAX_REPLY];
    let len = tokio::time::timeout(timeout, socket.recv(&mut buf))
        .await
        .map_err(|_| ClientError::Timeout(timeout))??;
    tracing::debug!(%target, bytes = len, "withdrawal reply received");

    Ok(String::from_utf8_lossy(&buf[..len]).trim_end().to_string())
}

async fn resolve(addr: &str) -> Result<SocketAddr, ClientError> {
    tokio::net::lookup_host(addr)
        .await
        .map_err(|_| ClientError::Resolve(addr.to_string()))?
        .next()
        .ok_or_else(|| ClientError::Resolve(addr.to_string()))
}
