//! Cancellable repeating callback for a cooperative, single-threaded host.
//!
//! There are no threads here. The host calls `take_due(now)` from its event
//! loop and runs the callback body as many times as periods have elapsed.
//! Cancelling and mutating state happen in the same synchronous step, so a
//! cancelled timer can never fire late.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatingTimer {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl RepeatingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer; the first period ends at `now + period`.
    /// Re-arming an active timer replaces it, so at most one schedule exists.
    pub fn start(&mut self, now_ms: u64, period_ms: u64) {
        self.period_ms = period_ms.max(1);
        self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Instant of the last period already handed out by `take_due`, or the
    /// start instant if none has come due yet.
    pub fn last_due_ms(&self) -> Option<u64> {
        self.next_due_ms.map(|due| due.saturating_sub(self.period_ms))
    }

    /// Number of whole periods that have come due by `now`, advancing the anchor past them.
    pub fn take_due(&mut self, now_ms: u64) -> u64 {
        let Some(due) = self.next_due_ms else {
            return 0;
        };
        if now_ms < due {
            return 0;
        }
        let fired = (now_ms - due) / self.period_ms + 1;
        self.next_due_ms = Some(due + fired * self.period_ms);
        fired
    }
}
