use std::thread;
use std::time::{Duration, Instant};

use log::debug;

/// Enforces a minimum gap between consecutive requests by sleeping inline.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Time left before the next request may go out.
    pub fn remaining(&self) -> Duration {
        match self.last_request {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Block until the interval since the previous call has passed, then record this call.
    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            debug!("Rate limiting: sleeping {:?}", remaining);
            thread::sleep(remaining);
        }
        self.last_request = Some(Instant::now());
    }
}
