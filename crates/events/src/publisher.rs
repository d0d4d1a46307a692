//! The single ordered snapshot queue.

use donation_core::Snapshot;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// The delivery task has stopped; nothing drains the queue.
    #[error("snapshot pipeline closed")]
    Closed,
}

/// Cloneable producer side of the queue, handed to every ingress path.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl SnapshotPublisher {
    /// Enqueue a snapshot. Never blocks.
    pub fn publish(&self, snapshot: Snapshot) -> Result<(), PublishError> {
        self.tx.send(snapshot).map_err(|_| PublishError::Closed)
    }

    /// Enqueue and log instead of failing; ingress paths use this after a
    /// commit, where a closed pipeline must not fail the request.
    pub fn publish_or_log(&self, snapshot: Snapshot) {
        let version = snapshot.version();
        if self.publish(snapshot).is_err() {
            tracing::warn!(version, "snapshot dropped: pipeline closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the queue. Owned by the delivery task.
#[derive(Debug)]
pub struct SnapshotQueue {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl SnapshotQueue {
    /// Next snapshot in enqueue order; `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

/// Create the queue.
pub fn snapshot_queue() -> (SnapshotPublisher, SnapshotQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SnapshotPublisher { tx }, SnapshotQueue { rx })
}
