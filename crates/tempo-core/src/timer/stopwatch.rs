//! Stopwatch with wall-clock elapsed time.
//!
//! Elapsed time is always recomputed as `accumulated + (now - run_start)`;
//! nothing accumulates per-tick deltas, so display ticks cannot drift it.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwatchState {
    accumulated_ms: u64,
    run_start_ms: Option<u64>,
    laps: Vec<u64>,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(accumulated_ms: u64, run_start_ms: Option<u64>, laps: Vec<u64>) -> Self {
        Self {
            accumulated_ms,
            run_start_ms,
            laps,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_start_ms.is_some()
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn run_start_ms(&self) -> Option<u64> {
        self.run_start_ms
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Live elapsed. A clock that stepped backwards contributes nothing.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.run_start_ms {
            Some(start) => self.accumulated_ms + now_ms.saturating_sub(start),
            None => self.accumulated_ms,
        }
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.run_start_ms = Some(now_ms);
        true
    }

    /// Fold the running segment into `accumulated_ms`.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.accumulated_ms = self.elapsed_ms(now_ms);
        self.run_start_ms = None;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the live elapsed value. Only while running.
    pub fn lap(&mut self, now_ms: u64) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        let elapsed = self.elapsed_ms(now_ms);
        self.laps.push(elapsed);
        Some(elapsed)
    }

    /// Fold elapsed time up to `now` and re-anchor the run there.
    ///
    /// Leaves `elapsed_ms(now)` unchanged; used before persisting so a
    /// snapshot's `accumulated_ms` is exact as of its save time.
    pub(crate) fn reanchor(&mut self, now_ms: u64) {
        if self.is_running() {
            self.accumulated_ms = self.elapsed_ms(now_ms);
            self.run_start_ms = Some(now_ms);
        }
    }
}
