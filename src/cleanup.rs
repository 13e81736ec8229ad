use std::time::Duration;

use crate::state::AppState;

/// Periodically removes reserved rooms nobody entered.
pub fn start_cleanup_task(state: AppState) -> tokio::task::JoinHandle<()> {
    let interval_secs = state.config.room_cleanup_interval_secs;
    let max_age = state.config.room_idle_ttl();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;
            let reaped = state.registry.reap_idle(max_age).await;
            if reaped > 0 {
                tracing::info!(
                    "Reaped {} idle rooms, {} remain",
                    reaped,
                    state.registry.room_count().await
                );
            }
        }
    })
}
