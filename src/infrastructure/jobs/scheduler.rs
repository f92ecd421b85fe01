//! Background scheduling for account reconciliation

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use super::sync_users::UserSync;

/// Runs `sync` every `period` on a background task, starting one period
/// from now. Returns `None` when `period` is zero.
pub fn spawn_periodic_sync(sync: Arc<UserSync>, period: Duration) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        info!("Periodic account sync disabled");
        return None;
    }

    info!(interval_secs = period.as_secs(), "Starting periodic account sync");

    Some(tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The startup run is the caller's
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sync.run().await;
        }
    }))
}
