//! The single delivery task draining the snapshot queue.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::publisher::SnapshotQueue;
use crate::registry::SubscriberRegistry;

/// Counters returned when the delivery task finishes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub snapshots_delivered: u64,
    pub snapshots_skipped: u64,
    pub subscribers_removed: u64,
    pub last_version: u64,
}

impl DeliveryStats {
    /// Snapshots older than the last delivered one are skipped so observers
    /// never see the ledger move backwards. Equal versions (heartbeats) pass.
    fn admits(&self, version: u64) -> bool {
        version >= self.last_version
    }
}

/// Spawn the delivery task. It ends once every `SnapshotPublisher` is dropped.
pub fn spawn_delivery(mut queue: SnapshotQueue, registry: Arc<SubscriberRegistry>) -> JoinHandle<DeliveryStats> {
    tokio::spawn(async move {
        let mut stats = DeliveryStats::default();

        while let Some(snapshot) = queue.recv().await {
            let version = snapshot.version();
            if !stats.admits(version) {
                tracing::debug!(version, last = stats.last_version, "stale snapshot skipped");
                stats.snapshots_skipped += 1;
                continue;
            }

            let report = registry.deliver(Arc::new(snapshot));
            stats.last_version = version;
            stats.snapshots_delivered += 1;
            stats.subscribers_removed += report.removed as u64;
            tracing::trace!(version, delivered = report.delivered, removed = report.removed, "snapshot delivered");
        }

        tracing::info!(?stats, "delivery task stopped");
        stats
    })
}
