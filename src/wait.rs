use std::{future::Future, time::Duration};

use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls `check` until it yields `Some`, giving up after `timeout`.
///
/// The first check runs immediately. A slow check delays the next tick rather
/// than bunching ticks up behind it.
pub async fn poll_until<T, F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let polling = async {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Some(value) = check().await {
                return value;
            }
        }
    };
    time::timeout(timeout, polling).await.ok()
}
