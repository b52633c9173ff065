use std::time::Duration;

use tokio::sync::watch;

use crate::db;
use crate::state::SharedState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Audit retention sweep: once a day, drop trail entries older than the
/// configured horizon. Runs until shutdown is signaled.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Retention sweep started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        match db::logs::purge_older_than(&state.pool, state.config.log_retention_days).await {
            Ok(0) => {}
            Ok(purged) => {
                tracing::info!(
                    "Purged {purged} audit entries older than {} days",
                    state.config.log_retention_days
                );
            }
            Err(e) => {
                tracing::error!("Retention sweep failed: {e}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Retention sweep stopped");
}
