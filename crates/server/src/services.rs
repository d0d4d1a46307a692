//! Shared state handed to every ingress path: the ledger and the broadcast
//! pipeline.

use std::sync::Arc;
use std::time::Duration;

use donation_core::{Ledger, LedgerStore, Snapshot};
use donation_events::{
    snapshot_queue, spawn_delivery, spawn_heartbeat, DeliveryStats, SnapshotPublisher,
    SubscriberRegistry,
};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct AppServices {
    ledger: Arc<dyn LedgerStore>,
    publisher: SnapshotPublisher,
    registry: Arc<SubscriberRegistry>,
}

impl AppServices {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        publisher: SnapshotPublisher,
        registry: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            ledger,
            publisher,
            registry,
        }
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    pub fn snapshot(&self) -> Snapshot {
        self.ledger.snapshot()
    }

    /// Enqueue a committed snapshot for broadcast. Called after the ledger
    /// lock is released.
    pub fn publish(&self, snapshot: Snapshot) {
        self.publisher.publish_or_log(snapshot);
    }
}

/// Background tasks owned by the pipeline.
#[derive(Debug)]
pub struct PipelineTasks {
    pub delivery: JoinHandle<DeliveryStats>,
    pub heartbeat: Option<JoinHandle<()>>,
}

impl PipelineTasks {
    pub fn abort(&self) {
        self.delivery.abort();
        if let Some(h) = &self.heartbeat {
            h.abort();
        }
    }
}

/// Wire a fresh in-memory ledger to the broadcast pipeline.
///
/// Must be called from inside a Tokio runtime: the delivery and heartbeat
/// tasks are spawned here.
pub fn build_services(heartbeat: Option<Duration>) -> (AppServices, PipelineTasks) {
    build_services_with(Arc::new(Ledger::new()), heartbeat)
}

/// Same as [`build_services`] with a caller-provided ledger.
pub fn build_services_with(
    ledger: Arc<dyn LedgerStore>,
    heartbeat: Option<Duration>,
) -> (AppServices, PipelineTasks) {
    let registry = Arc::new(SubscriberRegistry::new());
    let (publisher, queue) = snapshot_queue();

    let delivery = spawn_delivery(queue, registry.clone());
    let heartbeat = heartbeat.map(|period| {
        tracing::info!(period_ms = period.as_millis() as u64, "heartbeat enabled");
        spawn_heartbeat(ledger.clone(), publisher.clone(), period)
    });

    let services = AppServices::new(ledger, publisher, registry);
    (services, PipelineTasks { delivery, heartbeat })
}
