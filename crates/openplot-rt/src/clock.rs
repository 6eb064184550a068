//! Absolute-deadline tick clock for the periodic contexts.
//!
//! Deadlines advance by a fixed period from the previous deadline rather
//! than from the wakeup instant, so scheduling jitter does not accumulate
//! into drift. A context that wakes a full period or more past its deadline
//! has lost a tick; that is reported as a hard fault rather than silently
//! skipped, matching the rest of the fail-stop timing policy.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{RtError, RtResult};

/// Running timing statistics for one periodic context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Ticks completed on time
    pub ticks: u64,
    /// Worst observed wakeup lag behind the deadline
    pub max_lag: Duration,
    /// Wakeup lag of the most recent tick
    pub last_lag: Duration,
}

/// Fixed-period tick source with absolute deadlines.
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    next_deadline: Instant,
    stats: TickStats,
}

impl TickClock {
    /// Start a clock whose first deadline is one period from now.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: Instant::now() + period,
            stats: TickStats::default(),
        }
    }

    /// Configured tick period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Timing statistics so far.
    #[must_use]
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Discard the current deadline and restart one period from now.
    pub fn restart(&mut self) {
        self.next_deadline = Instant::now() + self.period;
    }

    /// Sleep until the next deadline and account for it.
    ///
    /// Returns the completed tick count. Waking a full period or more past
    /// the deadline returns [`RtError::MissedDeadline`] and leaves the clock
    /// in need of [`restart`](Self::restart).
    pub fn wait_for_tick(&mut self) -> RtResult<u64> {
        let now = Instant::now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
        }

        let lag = Instant::now().saturating_duration_since(self.next_deadline);
        self.stats.last_lag = lag;
        if lag >= self.period {
            return Err(RtError::MissedDeadline);
        }
        if lag > self.stats.max_lag {
            self.stats.max_lag = lag;
        }

        self.next_deadline += self.period;
        self.stats.ticks += 1;
        Ok(self.stats.ticks)
    }
}
