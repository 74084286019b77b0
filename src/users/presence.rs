use std::time::Duration;

use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::users::repo::User;

/// Background sweep that flips stale users offline. Runs for the lifetime of
/// the process.
pub fn spawn_sweeper(state: AppState) {
    let timeout = state.config.presence.online_timeout_secs;
    let every = Duration::from_secs(state.config.presence.sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match User::sweep_offline(&state.db, timeout).await {
                Ok(0) => debug!("presence sweep: nothing to do"),
                Ok(n) => info!(updated = n, "presence sweep: users flipped offline"),
                Err(e) => warn!(error = %e, "presence sweep failed"),
            }
        }
    });
}
