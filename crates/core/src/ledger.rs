//! The ledger: account name -> balance, guarded by one lock.
//!
//! Every operation holds the lock for its full read-modify-write and returns
//! the [`Snapshot`] captured inside the same critical section. Callers publish
//! that snapshot after the lock is gone; nothing here performs I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::account::{Account, Snapshot};
use crate::error::{LedgerError, LedgerResult};

/// Outcome of a committed operation plus the state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit<T> {
    pub value: T,
    pub snapshot: Snapshot,
}

/// Result of `register`: create-if-absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Registration {
    Created,
    AlreadyExists,
}

impl Registration {
    /// Whether the ledger changed.
    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created)
    }
}

/// Balances of both sides right after a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from_balance: i64,
    pub to_balance: i64,
}

/// Ledger contract shared by every ingress path.
///
/// Implementations must serialize all operations and must never return a
/// snapshot with a negative balance.
pub trait LedgerStore: Send + Sync {
    fn register(&self, name: &str) -> LedgerResult<Commit<Registration>>;

    fn credit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>>;

    fn debit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>>;

    fn transfer(&self, from: &str, to: &str, amount: i64) -> LedgerResult<Commit<TransferReceipt>>;

    fn snapshot(&self) -> Snapshot;
}

impl<L> LedgerStore for Arc<L>
where
    L: LedgerStore + ?Sized,
{
    fn register(&self, name: &str) -> LedgerResult<Commit<Registration>> {
        (**self).register(name)
    }

    fn credit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        (**self).credit(name, amount)
    }

    fn debit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        (**self).debit(name, amount)
    }

    fn transfer(&self, from: &str, to: &str, amount: i64) -> LedgerResult<Commit<TransferReceipt>> {
        (**self).transfer(from, to, amount)
    }

    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    version: u64,
    balances: BTreeMap<String, i64>,
}

impl LedgerState {
    fn snapshot(&self) -> Snapshot {
        let accounts = self
            .balances
            .iter()
            .map(|(name, balance)| Account::new(name.clone(), *balance))
            .collect();
        Snapshot::new(self.version, accounts)
    }

    fn commit<T>(&mut self, value: T) -> Commit<T> {
        self.version += 1;
        Commit {
            value,
            snapshot: self.snapshot(),
        }
    }

    fn balance(&self, name: &str) -> Option<i64> {
        self.balances.get(name).copied()
    }
}

/// In-memory ledger. One instance per process, shared behind `Arc`.
#[derive(Debug, Default)]
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ledger version (number of committed state changes).
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn balance(&self, name: &str) -> Option<i64> {
        self.lock().balance(name)
    }

    // Every critical section leaves the map consistent before it can panic,
    // so a poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_positive(amount: i64) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

impl LedgerStore for Ledger {
    fn register(&self, name: &str) -> LedgerResult<Commit<Registration>> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidName);
        }

        let mut state = self.lock();
        if state.balances.contains_key(name) {
            return Ok(Commit {
                value: Registration::AlreadyExists,
                snapshot: state.snapshot(),
            });
        }

        state.balances.insert(name.to_string(), 0);
        tracing::debug!(account = name, "account registered");
        Ok(state.commit(Registration::Created))
    }

    fn credit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        ensure_positive(amount)?;

        let mut state = self.lock();
        let balance = state
            .balances
            .get_mut(name)
            .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))?;
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(name.to_string()))?;
        *balance = updated;

        Ok(state.commit(updated))
    }

    fn debit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        ensure_positive(amount)?;

        let mut state = self.lock();
        let balance = state
            .balances
            .get_mut(name)
            .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                balance: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        let updated = *balance;

        Ok(state.commit(updated))
    }

    fn transfer(&self, from: &str, to: &str, amount: i64) -> LedgerResult<Commit<TransferReceipt>> {
        ensure_positive(amount)?;

        let mut state = self.lock();
        let from_balance = state
            .balance(from)
            .ok_or_else(|| LedgerError::SenderNotFound(from.to_string()))?;
        let to_balance = state
            .balance(to)
            .ok_or_else(|| LedgerError::RecipientNotFound(to.to_string()))?;

        if from_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                balance: from_balance,
                requested: amount,
            });
        }

        if from == to {
            return Ok(state.commit(TransferReceipt {
                from_balance,
                to_balance,
            }));
        }

        // Validate both sides before touching either.
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(to.to_string()))?;
        let new_from = from_balance - amount;

        state.balances.insert(from.to_string(), new_from);
        state.balances.insert(to.to_string(), new_to);

        Ok(state.commit(TransferReceipt {
            from_balance: new_from,
            to_balance: new_to,
        }))
    }

    fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }
}
