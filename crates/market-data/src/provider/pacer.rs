//! Spaces consecutive requests by a minimum delay.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct RequestPacer {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until `min_delay` has passed since the previous call returned.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            let now = Instant::now();
            if ready_at > now {
                debug!("Pacing request for {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
