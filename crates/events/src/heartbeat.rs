//! Periodic liveness snapshot.
//!
//! Every tick enqueues the current ledger state without mutating it, so
//! observers can tell the server is alive even when nothing changes.

use std::time::Duration;

use donation_core::LedgerStore;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::publisher::SnapshotPublisher;

/// Spawn the heartbeat task. It stops when the pipeline closes.
pub fn spawn_heartbeat<L>(ledger: L, publisher: SnapshotPublisher, period: Duration) -> JoinHandle<()>
where
    L: LedgerStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; observers have nothing to miss yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if publisher.publish(ledger.snapshot()).is_err() {
                tracing::debug!("heartbeat stopped: pipeline closed");
                break;
            }
        }
    })
}
