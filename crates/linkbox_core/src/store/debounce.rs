//! Debounced persistence scheduling.
//!
//! # Invariants
//! - At most one write is pending at any time.
//! - Rescheduling replaces the pending deadline; it never queues a second write.

use std::time::{Duration, Instant};

/// Time source for debounce deadlines.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Single pending write with a supersede-on-reschedule deadline.
#[derive(Debug, Clone)]
pub struct DebouncedWrite {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl DebouncedWrite {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    /// (Re)schedules the pending write to fire one quiet period after `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_period);
    }

    /// Drops the pending write. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the pending write if its deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
