//! Live set of observers.
//!
//! Each subscriber is a latest-value slot (`tokio::sync::watch`). Pushing into a
//! slot never blocks; an observer that falls behind only sees the newest
//! snapshot. A slot whose receiving side is gone fails the next push and is
//! removed by the delivery task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use donation_core::Snapshot;
use tokio::sync::watch;
use uuid::Uuid;

type Slot = watch::Sender<Option<Arc<Snapshot>>>;

/// Opaque subscriber handle id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Outcome of pushing one snapshot to every subscriber.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub removed: usize,
}

/// Registry of live subscribers, guarded by its own lock (never the ledger's).
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<SubscriberId, Slot>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe handshake: register a slot. Nothing is replayed; the first
    /// value the subscription yields is the next delivered snapshot.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = watch::channel(None);
        let id = SubscriberId::new();
        self.lock().insert(id, tx);
        tracing::info!(subscriber = %id, "subscriber registered");
        Subscription { id, rx }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Push a snapshot to every slot, dropping slots whose observer is gone.
    /// Dropping the slot closes the handle on the subscriber side.
    pub fn deliver(&self, snapshot: Arc<Snapshot>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut subs = self.lock();

        subs.retain(|id, slot| match slot.send(Some(snapshot.clone())) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(_) => {
                tracing::info!(subscriber = %id, "subscriber removed: channel closed");
                report.removed += 1;
                false
            }
        });

        report
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberId, Slot>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving side of one subscriber slot.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next snapshot. Returns `None` once the registry has dropped
    /// this subscriber.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }
}
