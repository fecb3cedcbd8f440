//! Persisted snapshot schema.
//!
//! Three independent keys. The JSON field names are part of the on-disk
//! format; a snapshot that fails to decode or validate is discarded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timer::{CountdownState, Durations, Mode, Preset, StopwatchState, UserSettings};

pub const COUNTDOWN_KEY: &str = "tempo.countdown";
pub const STOPWATCH_KEY: &str = "tempo.stopwatch";
pub const VOLUME_KEY: &str = "tempo.volume";

fn default_sessions_before_long_break() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    pub mode: Mode,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub preset: Preset,
    pub custom_durations: Durations,
    pub sound_enabled: bool,
    pub auto_save_on_complete: bool,
    pub daily_goal_sessions: u32,
    pub alarm_volume: f64,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    pub saved_at_epoch_ms: u64,
}

impl CountdownSnapshot {
    /// `ringing` is folded into `is_running`: a snapshot at zero that was
    /// running means the alarm had fired and was not yet acknowledged.
    pub fn capture(state: &CountdownState, ringing: bool, now_ms: u64) -> Self {
        let s = state.settings;
        Self {
            mode: state.mode(),
            remaining_seconds: state.remaining_secs(),
            is_running: state.is_running() || ringing,
            preset: state.preset(),
            custom_durations: state.custom_durations(),
            sound_enabled: s.sound_enabled,
            auto_save_on_complete: s.auto_save_on_complete,
            daily_goal_sessions: s.daily_goal_sessions,
            alarm_volume: s.alarm_volume,
            sessions_before_long_break: s.sessions_before_long_break,
            saved_at_epoch_ms: now_ms,
        }
    }

    pub fn settings(&self) -> UserSettings {
        UserSettings {
            sound_enabled: self.sound_enabled,
            auto_save_on_complete: self.auto_save_on_complete,
            daily_goal_sessions: self.daily_goal_sessions,
            alarm_volume: self.alarm_volume,
            sessions_before_long_break: self.sessions_before_long_break,
        }
    }

    /// The countdown exactly as saved, before any wall-clock correction.
    pub fn to_state(&self) -> CountdownState {
        CountdownState::from_parts(
            self.mode,
            self.remaining_seconds,
            self.is_running,
            self.preset,
            self.custom_durations,
            self.settings(),
        )
    }

    fn is_valid(&self) -> bool {
        self.custom_durations.validate().is_ok()
            && (0.0..=1.0).contains(&self.alarm_volume)
            && self.daily_goal_sessions > 0
            && self.sessions_before_long_break > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchSnapshot {
    pub accumulated_ms: u64,
    pub is_running: bool,
    pub run_start_epoch_ms: Option<u64>,
    pub laps: Vec<u64>,
    pub saved_at_epoch_ms: u64,
}

impl StopwatchSnapshot {
    /// Capture with elapsed folded up to `now`, so `accumulated_ms` is exact at save time.
    pub fn capture(state: &StopwatchState, now_ms: u64) -> Self {
        let mut folded = state.clone();
        folded.reanchor(now_ms);
        Self {
            accumulated_ms: folded.accumulated_ms(),
            is_running: folded.is_running(),
            run_start_epoch_ms: folded.run_start_ms(),
            laps: folded.laps().to_vec(),
            saved_at_epoch_ms: now_ms,
        }
    }

    fn is_valid(&self) -> bool {
        self.is_running == self.run_start_epoch_ms.is_some()
    }
}

pub fn decode_countdown(raw: &str) -> Option<CountdownSnapshot> {
    decode::<CountdownSnapshot>(COUNTDOWN_KEY, raw).filter(|snap| {
        let ok = snap.is_valid();
        if !ok {
            warn!(key = COUNTDOWN_KEY, "discarding out-of-range snapshot");
        }
        ok
    })
}

pub fn decode_stopwatch(raw: &str) -> Option<StopwatchSnapshot> {
    decode::<StopwatchSnapshot>(STOPWATCH_KEY, raw).filter(|snap| {
        let ok = snap.is_valid();
        if !ok {
            warn!(key = STOPWATCH_KEY, "discarding inconsistent snapshot");
        }
        ok
    })
}

/// The volume key holds a raw float.
pub fn decode_volume(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(snap) => Some(snap),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed snapshot");
            None
        }
    }
}
