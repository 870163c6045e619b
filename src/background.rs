//! Background maintenance worker.
//!
//! A single tokio task wakes on a fixed interval and runs the weekly
//! appointment cleanup. Running it on one task means successive sweeps can
//! never overlap; a sweep that is still in flight when the interval fires
//! simply delays the next tick instead of queueing a second run. The sweep
//! itself is idempotent within a week, so firing more often than necessary
//! only costs a storage round-trip.

use crate::{core::scheduler, storage::JsonStore};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Runs the cleanup sweep forever at the configured cadence.
///
/// Spawn this once at startup; it never returns.
pub async fn run_cleanup_worker(store: Arc<JsonStore>, interval_hours: u64) {
    info!(interval_hours, "starting appointment cleanup worker");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_hours * 3600));
    // Tick cadence counts from the end of each sweep, not wall-clock slots.
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let now = chrono::Local::now().naive_local();
        match scheduler::weekly_cleanup(&store, now).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "cleanup sweep removed stale appointments"),
            Err(e) => error!("cleanup sweep failed: {e}"),
        }
    }
}
