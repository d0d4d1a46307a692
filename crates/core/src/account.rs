//! Account and snapshot value types.

use serde::{Deserialize, Serialize, Serializer};

/// One named account and its balance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub balance: i64,
}

impl Account {
    pub fn new(name: impl Into<String>, balance: i64) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// Immutable copy of every account, sorted by name.
///
/// `version` is the ledger version the copy was taken at. It is not part of the
/// wire format: a snapshot serializes as a plain JSON array of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    version: u64,
    accounts: Vec<Account>,
}

impl Snapshot {
    pub fn new(version: u64, mut accounts: Vec<Account>) -> Self {
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Self { version, accounts }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn balance_of(&self, name: &str) -> Option<i64> {
        self.accounts
            .binary_search_by(|a| a.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.accounts[idx].balance)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances (transfers never change it).
    pub fn total(&self) -> i128 {
        self.accounts.iter().map(|a| a.balance as i128).sum()
    }

    /// JSON payload pushed to observers.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(version = self.version, error = %e, "snapshot serialization failed");
            String::new()
        })
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.accounts.serialize(serializer)
    }
}
