//! Cooperative periodic refresh timer.
//!
//! The timer is driven from the outside: the owner asks for the next
//! deadline, sleeps until then, and calls [`RefreshTimer::poll`]. Each
//! fire re-arms one period after the time it was observed, so late
//! polls push the schedule back instead of bursting to catch up.

/// Periodic timer over a millisecond uptime clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTimer {
    period_ms: u64,
    next_due: Option<u64>,
}

impl RefreshTimer {
    /// Create a disarmed timer.
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            next_due: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Arm the timer so it first fires one period after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due = Some(now_ms.saturating_add(self.period_ms));
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Uptime at which the next fire is due, or `None` when cancelled.
    pub fn next_deadline(&self) -> Option<u64> {
        self.next_due
    }

    /// Returns `true` (and re-arms) when the deadline has been reached.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.next_due {
            Some(due) if now_ms >= due => {
                self.start(now_ms);
                true
            }
            _ => false,
        }
    }
}
