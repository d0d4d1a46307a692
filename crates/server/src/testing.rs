//! Test doubles for the ledger contract.

use std::sync::{Arc, Mutex};

use donation_core::{
    Account, Commit, LedgerError, LedgerResult, LedgerStore, Registration, Snapshot, TransferReceipt,
};
use donation_events::{snapshot_queue, SnapshotQueue, SubscriberRegistry};

use crate::services::AppServices;

/// Scripted ledger: every mutating call returns `result` and is recorded.
#[derive(Debug)]
pub struct FakeLedger {
    result: Result<i64, LedgerError>,
    calls: Mutex<Vec<String>>,
}

impl FakeLedger {
    pub fn succeeding(balance: i64) -> Self {
        Self {
            result: Ok(balance),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: LedgerError) -> Self {
        Self {
            result: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record<T>(&self, call: String, value: impl FnOnce(i64) -> T) -> LedgerResult<Commit<T>> {
        self.calls.lock().unwrap().push(call);
        let balance = self.result.clone()?;
        Ok(Commit {
            value: value(balance),
            snapshot: Snapshot::new(1, vec![Account::new("fake", balance)]),
        })
    }
}

impl LedgerStore for FakeLedger {
    fn register(&self, name: &str) -> LedgerResult<Commit<Registration>> {
        self.record(format!("register {name}"), |_| Registration::Created)
    }

    fn credit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        self.record(format!("credit {name} {amount}"), |b| b)
    }

    fn debit(&self, name: &str, amount: i64) -> LedgerResult<Commit<i64>> {
        self.record(format!("debit {name} {amount}"), |b| b)
    }

    fn transfer(&self, from: &str, to: &str, amount: i64) -> LedgerResult<Commit<TransferReceipt>> {
        self.record(format!("transfer {from} {to} {amount}"), |b| TransferReceipt {
            from_balance: b,
            to_balance: b,
        })
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::default()
    }
}

/// Services over `ledger` with the queue exposed instead of a delivery task.
pub fn services_with(ledger: Arc<FakeLedger>) -> (AppServices, SnapshotQueue) {
    let (publisher, queue) = snapshot_queue();
    let services = AppServices::new(ledger, publisher, Arc::new(SubscriberRegistry::new()));
    (services, queue)
}
