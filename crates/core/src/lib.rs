//! `donation-core`: the shared in-memory ledger.
//!
//! This crate contains **pure domain** state (no network, no runtime). Ingress
//! adapters and the broadcast pipeline live in other crates and depend on the
//! [`LedgerStore`] contract defined here.

pub mod account;
pub mod error;
pub mod ledger;

pub use account::{Account, Snapshot};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Commit, Ledger, LedgerStore, Registration, TransferReceipt};
