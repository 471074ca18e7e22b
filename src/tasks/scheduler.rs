use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::state::AppState;
use crate::services::rate_limit::RateLimiter;

/// Starts the background loops. Each one exits once `shutdown` flips to true.
pub(crate) fn spawn(state: &AppState, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(1);

    let limiter = state.rate_limiter();
    if limiter.enabled() {
        let every = Duration::from_secs(state.settings().rate_limit().sweep_interval_seconds);
        handles.push(tokio::spawn(sweep_rate_limits_loop(limiter.clone(), every, shutdown)));
    }

    handles
}

pub(crate) async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Background task join failed");
        }
    }
}

async fn sweep_rate_limits_loop(
    limiter: RateLimiter,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tick = interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately and there is nothing to sweep yet.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                let removed = limiter.sweep_expired();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = limiter.tracked_windows(),
                        "Swept expired rate limit windows"
                    );
                }
            }
        }
    }
}
