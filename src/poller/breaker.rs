//! Circuit breaker for the credit event fetch path.
//!
//! Active only under the production profile. Three consecutive fetch
//! failures open the breaker; while open, poll ticks are skipped outright
//! until the recovery window has elapsed since the last failure, at which
//! point a single probe is allowed. A successful probe fully resets the
//! breaker; a failed one re-opens it with a fresh window.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    open: bool,
    fail_count: u32,
    last_fail: Option<Instant>,
    failure_threshold: u32,
    recovery: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery: Duration) -> Self {
        Self {
            open: false,
            fail_count: 0,
            last_fail: None,
            failure_threshold,
            recovery,
        }
    }

    /// Whether a fetch may be attempted right now. While open, only returns
    /// `true` once the recovery window since the last failure has passed
    /// (the probe attempt).
    pub fn should_attempt(&self) -> bool {
        if !self.open {
            return true;
        }
        match self.last_fail {
            Some(at) => at.elapsed() >= self.recovery,
            None => true,
        }
    }

    pub fn record_failure(&mut self) {
        self.fail_count += 1;
        self.last_fail = Some(Instant::now());
        if self.fail_count >= self.failure_threshold {
            self.open = true;
        }
    }

    pub fn record_success(&mut self) {
        self.open = false;
        self.fail_count = 0;
        self.last_fail = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }
}
