use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionKind, SessionRecord};
use crate::timer::{Mode, Preset};

/// Every state change in the engine produces an Event.
/// Hosts render from them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Reached zero, live or during reconstruction.
    CountdownCompleted {
        mode: Mode,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
    CountdownSkipped {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
    CountdownReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimeAdjusted {
        delta_minutes: i64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        preset: Preset,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    AlarmActivated {
        mode: Mode,
        /// The countdown finished while the host was not running timers.
        retroactive: bool,
        at: DateTime<Utc>,
    },
    AlarmAcknowledged {
        next_mode: Mode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StopwatchStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    LapRecorded {
        index: usize,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    SessionLogged {
        record: SessionRecord,
        at: DateTime<Utc>,
    },
    /// Auto-save failed; local timer state is unaffected.
    SessionLogFailed {
        kind: SessionKind,
        reason: String,
        at: DateTime<Utc>,
    },
    /// Live state was rebuilt from persisted snapshots.
    StateRestored {
        countdown_running: bool,
        stopwatch_running: bool,
        away_secs: u64,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        at: DateTime<Utc>,
    },
}

/// Full read-only view of the engine, for rendering and the state-change hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub preset: Preset,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub is_running: bool,
    pub is_ringing: bool,
    pub sessions_completed: u32,
    pub focus_minutes_today: u64,
    pub daily_goal_sessions: u32,
    /// 0.0 ..= 1.0
    pub daily_goal_progress: f64,
    pub stopwatch_elapsed_ms: u64,
    pub stopwatch_running: bool,
    pub laps: Vec<u64>,
    pub alarm_volume: f64,
    pub sound_enabled: bool,
    pub auto_save_on_complete: bool,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let ev = Event::CountdownSkipped {
            from: Mode::Focus,
            to: Mode::ShortBreak,
            at: DateTime::<Utc>::default(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "CountdownSkipped");
        assert_eq!(json["to"], "shortBreak");
    }
}
