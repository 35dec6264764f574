//! Fixed-period ticking driven by elapsed time
//!
//! Instead of callbacks that re-arm themselves, the frame driver owns one
//! [`Ticker`] per periodic task and asks it how many periods have elapsed. A task
//! that is no longer active is simply not polled; [`Ticker::reset`] re-arms it
//! when it becomes active again so no backlog of ticks is replayed.

use std::time::Duration;

/// Upper bound on ticks replayed in one poll, e.g. after the window was dragged
const MAX_CATCH_UP: u32 = 8;

/// Tick period for a rate in ticks per second, in whole milliseconds
pub fn period_for_rate(rate: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(rate.max(1)))
}

#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    last: Duration,
}

impl Ticker {
    pub fn new(period: Duration, now: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            last: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of whole periods elapsed since the last tick, capped at a
    /// small catch-up budget.
    pub fn due(&mut self, now: Duration) -> u32 {
        let elapsed = now.saturating_sub(self.last);
        let periods = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        if periods == 0 {
            return 0;
        }

        if periods > MAX_CATCH_UP {
            log::trace!("ticker skipped {} periods", periods - MAX_CATCH_UP);
            self.last = now;
            return MAX_CATCH_UP;
        }
        self.last += self.period * periods;
        periods
    }

    /// Changes the period from the next tick on; time already counted is kept.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period.max(Duration::from_millis(1));
    }

    pub fn reset(&mut self, now: Duration) {
        self.last = now;
    }
}
