//! Countdown state machine.
//!
//! Pure state: no clock, no storage, no side effects. The session engine
//! wraps it with tick scheduling, the alarm, the wake lock and persistence.
//!
//! ## Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Completed) ; Completed -> (acknowledge) -> Idle(next mode)
//! ```

use serde::{Deserialize, Serialize};

use super::mode::{Durations, Mode, Preset};
use crate::error::ValidationError;

/// Minimum remaining time after an adjustment.
pub const MIN_ADJUSTED_SECS: u64 = 60;

/// User preferences carried with the countdown snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub sound_enabled: bool,
    pub auto_save_on_complete: bool,
    pub daily_goal_sessions: u32,
    pub alarm_volume: f64,
    pub sessions_before_long_break: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            auto_save_on_complete: true,
            daily_goal_sessions: 8,
            alarm_volume: 0.5,
            sessions_before_long_break: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    Ticked,
    /// Reached zero on this tick. Carries the mode that finished.
    Completed(Mode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    mode: Mode,
    remaining_secs: u64,
    running: bool,
    sessions_completed: u32,
    preset: Preset,
    custom: Durations,
    pub settings: UserSettings,
}

impl CountdownState {
    /// Idle in `Focus`, loaded with the preset's focus duration.
    pub fn new(preset: Preset, custom: Durations, settings: UserSettings) -> Self {
        let mut state = Self {
            mode: Mode::Focus,
            remaining_secs: 0,
            running: false,
            sessions_completed: 0,
            preset,
            custom,
            settings,
        };
        state.remaining_secs = state.configured_secs();
        state
    }

    /// Rebuild from persisted parts without recomputing anything.
    pub(crate) fn from_parts(
        mode: Mode,
        remaining_secs: u64,
        running: bool,
        preset: Preset,
        custom: Durations,
        settings: UserSettings,
    ) -> Self {
        Self {
            mode,
            remaining_secs,
            running,
            sessions_completed: 0,
            preset,
            custom,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn custom_durations(&self) -> Durations {
        self.custom
    }

    /// Active durations: the preset's, or the custom triple.
    pub fn durations(&self) -> Durations {
        self.preset.durations().unwrap_or(self.custom)
    }

    /// Configured length of the current mode in seconds.
    pub fn configured_secs(&self) -> u64 {
        self.durations().seconds(self.mode)
    }

    /// Seconds run so far in this mode, measured against the configured length.
    ///
    /// Time added with `adjust` is not accounted for.
    pub fn elapsed_secs(&self) -> u64 {
        self.configured_secs().saturating_sub(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `false` if already running. A countdown sitting at zero is
    /// reloaded with the configured duration first.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        if self.remaining_secs == 0 {
            self.remaining_secs = self.configured_secs();
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_many(1)
    }

    /// Advance by up to `secs` seconds, stopping at zero.
    pub fn tick_many(&mut self, secs: u64) -> TickOutcome {
        if !self.running || secs == 0 {
            return TickOutcome::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(secs);
        if self.remaining_secs > 0 {
            return TickOutcome::Ticked;
        }
        self.complete()
    }

    /// Stop at zero. Finishing a focus round bumps the daily counter.
    pub(crate) fn complete(&mut self) -> TickOutcome {
        self.running = false;
        self.remaining_secs = 0;
        if self.mode == Mode::Focus {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        TickOutcome::Completed(self.mode)
    }

    /// Cancel the run and rotate to the next mode.
    pub fn skip_to_next(&mut self) -> Mode {
        self.running = false;
        self.rotate()
    }

    /// Rotate after an acknowledged alarm.
    pub fn rotate(&mut self) -> Mode {
        self.mode = self
            .mode
            .next(self.sessions_completed, self.settings.sessions_before_long_break);
        self.remaining_secs = self.configured_secs();
        self.mode
    }

    /// Add or remove whole minutes, never leaving less than a minute.
    pub fn adjust(&mut self, delta_minutes: i64) -> u64 {
        let delta = delta_minutes.saturating_mul(60);
        let current = i64::try_from(self.remaining_secs).unwrap_or(i64::MAX);
        let adjusted = current.saturating_add(delta).max(MIN_ADJUSTED_SECS as i64);
        self.remaining_secs = adjusted as u64;
        self.remaining_secs
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.running = false;
        self.mode = mode;
        self.remaining_secs = self.configured_secs();
    }

    pub fn set_preset(&mut self, preset: Preset) {
        self.running = false;
        self.preset = preset;
        self.remaining_secs = self.configured_secs();
    }

    /// Store a custom triple and switch to the `Custom` preset.
    pub fn set_custom_durations(&mut self, durations: Durations) -> Result<(), ValidationError> {
        durations.validate()?;
        self.custom = durations;
        self.set_preset(Preset::Custom);
        Ok(())
    }

    /// Stop and reload the current mode's configured duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_secs = self.configured_secs();
    }

    pub(crate) fn set_sessions_completed(&mut self, n: u32) {
        self.sessions_completed = n;
    }

    pub(crate) fn set_remaining(&mut self, secs: u64, running: bool) {
        self.remaining_secs = secs;
        self.running = running && secs > 0;
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new(Preset::default(), Durations::default(), UserSettings::default())
    }
}
