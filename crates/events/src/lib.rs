//! Broadcast pipeline: snapshot queue, subscriber registry, delivery and heartbeat.
//!
//! ```text
//! ingress (deposit / withdrawal / control plane) ─┐
//!                                      heartbeat ─┼─> SnapshotPublisher ─> queue ─> delivery task ─> SubscriberRegistry ─> observers
//! ```
//!
//! The queue is unbounded and drained by exactly one task, so snapshots leave
//! in the order they were enqueued. Each subscriber owns a latest-value slot:
//! a slow observer skips intermediate snapshots instead of stalling delivery.

pub mod delivery;
pub mod heartbeat;
pub mod publisher;
pub mod registry;

pub use delivery::{spawn_delivery, DeliveryStats};
pub use heartbeat::spawn_heartbeat;
pub use publisher::{snapshot_queue, PublishError, SnapshotPublisher, SnapshotQueue};
pub use registry::{DeliveryReport, SubscriberId, SubscriberRegistry, Subscription};
