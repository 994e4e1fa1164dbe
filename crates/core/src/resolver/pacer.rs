//! Fixed-interval pacing for upstream API calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Enforces a fixed delay between consecutive upstream calls.
///
/// The interval is measured from the *completion* of the previous call, not
/// its start: `pace` waits until the interval has elapsed since the last
/// `completed` mark, so a slow upstream response never eats into the gap.
pub struct RequestPacer {
    interval: Duration,
    last_completed: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_completed: Mutex::new(None),
        }
    }

    /// Wait until the pacing interval has elapsed since the last completed call.
    pub async fn pace(&self) {
        let last = self.last_completed.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.interval {
                let wait_time = self.interval - elapsed;
                debug!("pacing upstream call: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }
    }

    /// Mark the current call as completed, restarting the interval.
    pub async fn completed(&self) {
        let mut last = self.last_completed.lock().await;
        *last = Some(Instant::now());
    }
}
