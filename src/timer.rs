//! Repeating interval clocks for the frame loop
//!
//! The frame loop polls these instead of spawning real timers; each
//! concern (gravity, horizontal repeat) owns exactly one clock, and
//! rescheduling always replaces the previous deadline so stale ticks
//! cannot pile up.

use std::time::{Duration, Instant};

/// A cancellable repeating deadline
#[derive(Debug)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    /// Create a stopped clock with an initial period
    pub fn stopped(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm (or re-arm) the clock: the previous deadline is discarded and
    /// the next tick is one full `period` from `now`.
    pub fn restart(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.next_due = Some(now + period);
    }

    /// Disarm the clock; `poll` returns false until the next `restart`
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Fire at most once if the deadline has passed, re-arming for the
    /// following period.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}
