//! Text wire format shared by the deposit (TCP) and withdrawal (UDP) paths.
//!
//! Requests carry two newline-separated fields, `<name>` and `<amount>`.
//! Replies are a single line.

use donation_core::{LedgerError, Snapshot};
use thiserror::Error;

/// Longest accepted line on the deposit connection.
pub const MAX_LINE: usize = 1024;

/// Largest accepted withdrawal datagram; anything longer is rejected whole.
pub const MAX_DATAGRAM: usize = 1024;

/// Malformed request. `Display` is the reply sent back to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid request format")]
    MissingField,

    #[error("Invalid amount. Please enter a valid integer.")]
    InvalidAmount(String),

    #[error("Invalid request format")]
    Oversized(usize),
}

/// One deposit or withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRequest {
    pub name: String,
    pub amount: i64,
}

/// Parse a signed decimal integer, surrounding whitespace ignored.
pub fn parse_amount(raw: &str) -> Result<i64, ProtocolError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ProtocolError::InvalidAmount(raw.trim().to_string()))
}

/// Build a request from the two fields read off a connection.
pub fn parse_fields(name: &str, amount: &str) -> Result<BalanceRequest, ProtocolError> {
    Ok(BalanceRequest {
        name: name.trim().to_string(),
        amount: parse_amount(amount)?,
    })
}

/// Parse one withdrawal datagram: `<name>\n<amount>`, optional trailing newline.
pub fn parse_datagram(payload: &[u8]) -> Result<BalanceRequest, ProtocolError> {
    if payload.len() > MAX_DATAGRAM {
        return Err(ProtocolError::Oversized(payload.len()));
    }

    let text = String::from_utf8_lossy(payload);
    let mut fields = text.trim().splitn(2, '\n');

    match (fields.next(), fields.next()) {
        (Some(name), Some(amount)) => parse_fields(name, amount),
        _ => Err(ProtocolError::MissingField),
    }
}

/// Reply to send plus, when the ledger changed, the snapshot to broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reply: String,
    pub snapshot: Option<Snapshot>,
}

impl Outcome {
    pub fn committed(reply: String, snapshot: Snapshot) -> Self {
        Self {
            reply,
            snapshot: Some(snapshot),
        }
    }

    pub fn rejected(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            snapshot: None,
        }
    }
}

/// Success reply for deposits and withdrawals.
pub fn balance_reply(name: &str, balance: i64) -> String {
    format!("{name}'s new balance: ${balance}")
}

/// Human-readable message for a rejected ledger operation.
pub fn ledger_error_message(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::InvalidName => "Account name must not be empty",
        LedgerError::InvalidAmount(_) => "Amount must be a positive integer",
        LedgerError::BalanceOverflow(_) => "Amount too large",
        LedgerError::AccountNotFound(_) => "User not found",
        LedgerError::SenderNotFound(_) => "Sender not found",
        LedgerError::RecipientNotFound(_) => "Recipient not found",
        LedgerError::InsufficientFunds { .. } => "Insufficient balance",
    }
}
