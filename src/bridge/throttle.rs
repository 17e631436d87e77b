//! Outbound request throttle.

use std::time::{Duration, Instant};

/// A token bucket that refills at `rate` tokens per second and holds at most
/// one second worth of tokens.
#[derive(Debug)]
pub struct RequestThrottle {
    tokens: f64,
    capacity: f64,
    rate: f64,
    last_update: Instant,
}

impl RequestThrottle {
    /// `rate` of zero disables throttling.
    pub fn new(rate: u32) -> Self {
        let rate = rate as f64;
        Self {
            tokens: rate,
            capacity: rate,
            rate,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    pub fn try_acquire(&mut self) -> bool {
        if self.rate <= 0.0 {
            return true;
        }
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Wait until a token is available, then take it.
    pub async fn acquire(&mut self) {
        while !self.try_acquire() {
            let missing = (1.0 - self.tokens).max(0.0);
            let wait = Duration::from_secs_f64(missing / self.rate);
            tracing::trace!(wait_ms = wait.as_millis() as u64, "Bridge request throttled");
            tokio::time::sleep(wait).await;
        }
    }
}
