//! Background patient-list refresh
//!
//! The dashboard polls the storage service instead of receiving pushes;
//! the merge in [`Dashboard`](crate::dashboard::Dashboard) keeps in-flight
//! triage edits from flickering when a snapshot lands.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::AppState;

/// Fetch one snapshot and merge it into the dashboard.
///
/// Returns the number of records merged.
pub async fn refresh_once(state: &AppState) -> swh_common::Result<usize> {
    let records = state.client.list_patients().await?;
    let count = records.len();
    state.dashboard.write().await.merge(records);
    Ok(count)
}

/// Spawn the refresh loop: one fetch immediately, then one per interval
/// tick. Fetch failures are logged and swallowed; the dashboard keeps
/// serving its last merged snapshot, so a storage outage degrades to a
/// stale view rather than an error page.
///
/// In-flight fetches are never cancelled; an overlapping or late response
/// is harmless because the merge is idempotent by folder id.
pub fn spawn_refresh_task(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match refresh_once(&state).await {
                Ok(count) => debug!("Merged patient snapshot ({} records)", count),
                Err(e) => warn!("Patient list refresh failed: {}", e),
            }
        }
    })
}
