//! Ledger error model.

use thiserror::Error;

/// Result type used by every ledger operation.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// These are deterministic business failures. Ingress adapters translate them
/// into protocol replies; none of them is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The account name was empty after trimming.
    #[error("account name must not be empty")]
    InvalidName,

    /// The amount was zero or negative.
    #[error("amount must be a positive integer, got {0}")]
    InvalidAmount(i64),

    /// Applying the amount would overflow the balance.
    #[error("balance overflow for account {0}")]
    BalanceOverflow(String),

    /// Credit/debit target is unknown.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Transfer source is unknown.
    #[error("sender not found: {0}")]
    SenderNotFound(String),

    /// Transfer destination is unknown.
    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    /// Debit or transfer exceeds the current balance.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
}

impl LedgerError {
    /// True for errors caused by malformed input rather than ledger state.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidName | LedgerError::InvalidAmount(_) | LedgerError::BalanceOverflow(_)
        )
    }

    /// True when the error names an account that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound(_)
                | LedgerError::SenderNotFound(_)
                | LedgerError::RecipientNotFound(_)
        )
    }
}
