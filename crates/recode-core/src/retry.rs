//! Delay strategies for polling loops.
//!
//! The module monitor polls the host's module list with no timeout. A strategy
//! only decides how long to sleep between unsuccessful polls; it never gives up.

use std::time::Duration;

use crate::memory::layout::timing;

pub trait RetryStrategy {
    /// Delay before poll number `attempt + 1` (the first retry has `attempt == 0`).
    fn delay(&self, attempt: u32) -> Duration;
}

/// Poll again immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl RetryStrategy for NoDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Same delay after every unsuccessful poll.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl RetryStrategy for FixedDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Doubling delay, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(timing::MODULE_POLL_INTERVAL_MS),
            Duration::from_millis(timing::MAX_MODULE_POLL_INTERVAL_MS),
        )
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

impl<T: RetryStrategy + ?Sized> RetryStrategy for Box<T> {
    fn delay(&self, attempt: u32) -> Duration {
        (**self).delay(attempt)
    }
}
