//! Background sweep flipping `active` off on expired ban rows.
//!
//! Housekeeping only: `is_banned` evaluates expiry lazily, so ban checks
//! stay correct whether or not this task runs.

use crate::store::BanStore;
use std::sync::Arc;
use std::time::Duration;

pub fn spawn_ban_reaper(
    bans: Arc<dyn BanStore>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match bans.deactivate_expired().await {
                Ok(0) => {}
                Ok(flipped) => {
                    tracing::info!(expired = flipped, "Deactivated expired ban rows");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Ban reaper sweep failed");
                }
            }
        }
    })
}
