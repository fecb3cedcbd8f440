//! Integration tests for suspend/resume reconstruction.
//!
//! Snapshots are written straight into the store with synthetic timestamps,
//! then a fresh engine (a cold start) or the same engine (a resume) rebuilds
//! live state from them.

use std::rc::Rc;

use proptest::prelude::*;
use serde_json::json;
use tempo_core::clock::to_datetime;
use tempo_core::session::NewSession;
use tempo_core::storage::snapshot::{COUNTDOWN_KEY, STOPWATCH_KEY, VOLUME_KEY};
use tempo_core::{
    EngineOptions, Event, KeyValueStore, ManualClock, MemoryBackend, MemoryStore, Mode,
    SessionBackend, SessionEngine, SessionKind,
};

const T0: u64 = 1_760_443_200_000; // 2025-10-14T12:00:00Z

struct Harness {
    clock: ManualClock,
    store: Rc<MemoryStore>,
    backend: Rc<MemoryBackend>,
}

impl Harness {
    fn new() -> Self {
        Self {
            clock: ManualClock::new(T0),
            store: Rc::new(MemoryStore::new()),
            backend: Rc::new(MemoryBackend::new()),
        }
    }

    /// A new engine instance over the same store, like a page reload.
    fn engine(&self) -> SessionEngine {
        SessionEngine::new(
            EngineOptions::default(),
            Box::new(Rc::clone(&self.store)),
            Box::new(Rc::clone(&self.backend)),
        )
        .with_clock(self.clock.clone())
    }

    fn countdown_snapshot(&self, mode: &str, remaining: u64, running: bool, saved_at: u64) {
        let snap = json!({
            "mode": mode,
            "remainingSeconds": remaining,
            "isRunning": running,
            "preset": "pomodoro",
            "customDurations": { "focus": 25, "shortBreak": 5, "longBreak": 15 },
            "soundEnabled": true,
            "autoSaveOnComplete": true,
            "dailyGoalSessions": 8,
            "alarmVolume": 0.5,
            "savedAtEpochMs": saved_at,
        });
        self.store.set(COUNTDOWN_KEY, &snap.to_string()).unwrap();
    }

    fn completed_focus_today(&self, count: u32) {
        for i in 0..count {
            let at = to_datetime(T0 - u64::from(i + 1) * 3_600_000);
            self.backend
                .insert_session(&NewSession {
                    user_id: "local".into(),
                    duration_minutes: 25,
                    kind: SessionKind::Focus,
                    is_completed: true,
                    task_title: None,
                    started_at: at - chrono::Duration::minutes(25),
                    completed_at: at,
                })
                .unwrap();
        }
    }
}

#[test]
fn pomodoro_finished_while_away_rings_on_reload() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.start_countdown();
    assert_eq!(engine.countdown().remaining_secs(), 1500);

    h.clock.advance(1_620_000); // 27 minutes, no ticks ran
    let mut reloaded = h.engine();
    let events = reloaded.restore();

    assert!(reloaded.is_ringing());
    assert_eq!(reloaded.countdown().remaining_secs(), 0);
    assert!(!reloaded.countdown().is_running());
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::AlarmActivated { retroactive: true, .. })));

    let records = h.backend.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, SessionKind::Focus);
    assert_eq!(records[0].duration_minutes, 25);
    assert_eq!(records[0].completed_at, to_datetime(T0 + 1_500_000));
}

#[test]
fn partially_elapsed_countdown_resumes_running() {
    let h = Harness::new();
    h.countdown_snapshot("focus", 1500, true, T0);
    h.clock.set(T0 + 600_400);

    let mut engine = h.engine();
    engine.restore();
    assert_eq!(engine.countdown().remaining_secs(), 900);
    assert!(engine.countdown().is_running());
    assert!(engine.countdown_tick_active());
    assert!(!engine.is_ringing());

    // The tick timer was re-anchored at resume time.
    assert!(engine.poll().is_empty());
    assert_eq!(engine.countdown().remaining_secs(), 900);
    h.clock.advance(1_000);
    engine.poll();
    assert_eq!(engine.countdown().remaining_secs(), 899);
}

#[test]
fn paused_snapshot_is_restored_unchanged() {
    let h = Harness::new();
    h.countdown_snapshot("shortBreak", 200, false, T0);
    h.clock.set(T0 + 3_600_000);

    let mut engine = h.engine();
    engine.restore();
    assert_eq!(engine.countdown().mode(), Mode::ShortBreak);
    assert_eq!(engine.countdown().remaining_secs(), 200);
    assert!(!engine.countdown().is_running());
    assert!(!engine.countdown_tick_active());
}

#[test]
fn same_instance_suspend_resume_uses_wall_clock() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.start_countdown();
    h.clock.advance(5_000);
    engine.poll();
    assert_eq!(engine.countdown().remaining_secs(), 1495);

    engine.on_suspend();
    assert!(!engine.is_foreground());
    h.clock.advance(600_000);
    engine.on_resume();
    assert!(engine.is_foreground());
    assert_eq!(engine.countdown().remaining_secs(), 895);

    // No stale catch-up tick after reconstruction.
    engine.poll();
    assert_eq!(engine.countdown().remaining_secs(), 895);
}

#[test]
fn unacknowledged_alarm_survives_reload_without_relogging() {
    let h = Harness::new();
    h.countdown_snapshot("focus", 60, true, T0);
    h.clock.set(T0 + 61_000);
    let mut first = h.engine();
    first.restore();
    assert!(first.is_ringing());
    assert_eq!(h.backend.records().len(), 1);
    assert_eq!(first.countdown().sessions_completed(), 1);

    h.clock.advance(120_000);
    let mut second = h.engine();
    let events = second.restore();
    assert!(second.is_ringing());
    assert_eq!(h.backend.records().len(), 1);
    assert_eq!(second.countdown().sessions_completed(), 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::CountdownCompleted { .. })));
}

#[test]
fn fourth_session_rotates_to_long_break_on_acknowledge() {
    let h = Harness::new();
    h.completed_focus_today(3);
    let mut engine = h.engine();
    engine.restore();
    assert_eq!(engine.countdown().sessions_completed(), 3);
    assert_eq!(engine.daily_progress().focus_minutes, 75);

    engine.adjust_time(-24).unwrap();
    engine.start_countdown();
    h.clock.advance(60_000);
    engine.poll();
    assert!(engine.is_ringing());
    assert_eq!(engine.countdown().sessions_completed(), 4);

    let events = engine.acknowledge_alarm();
    assert!(matches!(
        events[0],
        Event::AlarmAcknowledged {
            next_mode: Mode::LongBreak,
            duration_secs: 900,
            ..
        }
    ));
    assert_eq!(engine.countdown().mode(), Mode::LongBreak);
    assert_eq!(engine.countdown().remaining_secs(), 15 * 60);
    assert!(!engine.is_ringing());
    assert!(!engine.alarm_is_looping());
}

#[test]
fn break_acknowledge_returns_to_focus() {
    let h = Harness::new();
    h.countdown_snapshot("longBreak", 30, true, T0);
    h.clock.set(T0 + 40_000);
    let mut engine = h.engine();
    engine.restore();
    assert!(engine.is_ringing());
    assert_eq!(engine.countdown().sessions_completed(), 0);

    engine.acknowledge_alarm();
    assert_eq!(engine.countdown().mode(), Mode::Focus);
    assert_eq!(engine.countdown().remaining_secs(), 1500);
}

#[test]
fn stopwatch_reload_reanchors_running_segment() {
    let h = Harness::new();
    let snap = json!({
        "accumulatedMs": 10_000,
        "isRunning": true,
        "runStartEpochMs": T0,
        "laps": [4_000],
        "savedAtEpochMs": T0,
    });
    h.store.set(STOPWATCH_KEY, &snap.to_string()).unwrap();
    h.clock.set(T0 + 5_000);

    let mut engine = h.engine();
    engine.restore();
    assert_eq!(engine.stopwatch().accumulated_ms(), 15_000);
    assert_eq!(engine.stopwatch().run_start_ms(), Some(T0 + 5_000));
    assert!(engine.stopwatch().is_running());
    assert_eq!(engine.stopwatch().laps(), &[4_000]);

    h.clock.advance(2_000);
    assert_eq!(engine.stopwatch_elapsed_ms(), 17_000);
}

#[test]
fn corrupt_snapshots_fall_back_to_defaults() {
    let h = Harness::new();
    h.store.set(COUNTDOWN_KEY, "{\"mode\": 7").unwrap();
    h.store.set(STOPWATCH_KEY, "garbage").unwrap();
    h.store.set(VOLUME_KEY, "very loud").unwrap();

    let mut engine = h.engine();
    let events = engine.restore();
    assert!(matches!(events.last(), Some(Event::StateRestored { .. })));
    assert_eq!(engine.countdown().mode(), Mode::Focus);
    assert_eq!(engine.countdown().remaining_secs(), 1500);
    assert!(!engine.countdown().is_running());
    assert_eq!(engine.stopwatch_elapsed_ms(), 0);
    assert_eq!(engine.countdown().settings.alarm_volume, 0.5);

    // Rewritten with valid data, and the empty stopwatch key is gone.
    let raw = h.store.get(COUNTDOWN_KEY).unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
    assert!(h.store.get(STOPWATCH_KEY).unwrap().is_none());
}

#[test]
fn first_run_uses_defaults() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.restore();
    let snap = engine.snapshot();
    assert_eq!(snap.mode, Mode::Focus);
    assert_eq!(snap.remaining_secs, 1500);
    assert!(!snap.is_running);
    assert!(!snap.is_ringing);
}

#[test]
fn volume_key_overrides_snapshot_volume() {
    let h = Harness::new();
    h.countdown_snapshot("focus", 1500, false, T0);
    h.store.set(VOLUME_KEY, "0.9").unwrap();
    let mut engine = h.engine();
    engine.restore();
    assert_eq!(engine.countdown().settings.alarm_volume, 0.9);
}

#[test]
fn stopwatch_reset_clears_persisted_snapshot() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.start_stopwatch();
    assert!(h.store.get(STOPWATCH_KEY).unwrap().is_some());
    h.clock.advance(3_000);
    engine.lap();
    engine.reset_stopwatch();
    assert!(h.store.get(STOPWATCH_KEY).unwrap().is_none());

    let mut reloaded = h.engine();
    reloaded.restore();
    assert_eq!(reloaded.stopwatch_elapsed_ms(), 0);
    assert!(reloaded.stopwatch().laps().is_empty());
}

#[test]
fn unpolled_gap_before_suspend_is_recovered() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.start_countdown();
    h.clock.advance(60_000);
    engine.on_suspend();

    let mut reloaded = h.engine();
    reloaded.restore();
    assert_eq!(reloaded.countdown().remaining_secs(), 1440);
    assert!(reloaded.countdown().is_running());
}

#[test]
fn unrelated_mutation_during_unpolled_gap_keeps_countdown_exact() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.start_countdown();
    engine.start_stopwatch();
    h.clock.advance(30_000);
    assert!(engine.lap().is_some());
    engine.set_alarm_volume(0.7).unwrap();

    let mut reloaded = h.engine();
    reloaded.restore();
    assert_eq!(reloaded.countdown().remaining_secs(), 1470);
    assert_eq!(reloaded.stopwatch_elapsed_ms(), 30_000);
    assert_eq!(reloaded.countdown().settings.alarm_volume, 0.7);
}

#[test]
fn countdown_that_ran_out_during_unpolled_gap_rings_on_reload() {
    let h = Harness::new();
    let mut engine = h.engine();
    engine.adjust_time(-24).unwrap();
    engine.start_countdown();
    h.clock.advance(90_000);
    engine.flush();

    let mut reloaded = h.engine();
    reloaded.restore();
    assert!(reloaded.is_ringing());
    assert_eq!(reloaded.countdown().remaining_secs(), 0);
    assert_eq!(h.backend.records().len(), 1);
}

#[derive(Debug, Clone)]
enum Step {
    Wait(u64),
    Flush,
    Lap,
    Volume,
    Poll,
    Reload,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1u64..=120).prop_map(Step::Wait),
        Just(Step::Flush),
        Just(Step::Lap),
        Just(Step::Volume),
        Just(Step::Poll),
        Just(Step::Reload),
    ]
}

proptest! {
    #[test]
    fn persisted_countdown_tracks_wall_clock_through_any_interleaving(
        steps in prop::collection::vec(step(), 1..30),
    ) {
        let h = Harness::new();
        let mut engine = h.engine();
        engine.start_countdown();
        engine.start_stopwatch();
        let mut waited_secs = 0u64;

        for s in steps {
            match s {
                Step::Wait(secs) => {
                    h.clock.advance(secs * 1_000);
                    waited_secs += secs;
                }
                Step::Flush => engine.flush(),
                Step::Lap => { engine.lap(); }
                Step::Volume => { engine.set_alarm_volume(0.4).unwrap(); }
                Step::Poll => { engine.poll(); }
                Step::Reload => {
                    engine.on_suspend();
                    engine = h.engine();
                    engine.restore();
                }
            }
        }

        engine.on_suspend();
        let mut reloaded = h.engine();
        reloaded.restore();
        let expected = 1500u64.saturating_sub(waited_secs);
        prop_assert_eq!(reloaded.countdown().remaining_secs(), expected);
        prop_assert_eq!(reloaded.is_ringing(), expected == 0);
        prop_assert_eq!(reloaded.stopwatch_elapsed_ms(), waited_secs * 1_000);
    }
}

proptest! {
    #[test]
    fn reconstructed_remaining_matches_wall_clock(
        total in 0u64..=7_200,
        away_secs in 0u64..=10_000,
        sub_ms in 0u64..1_000,
    ) {
        let h = Harness::new();
        h.countdown_snapshot("focus", total, true, T0);
        h.clock.set(T0 + away_secs * 1_000 + sub_ms);

        let mut engine = h.engine();
        engine.restore();
        let expected = total.saturating_sub(away_secs);
        prop_assert_eq!(engine.countdown().remaining_secs(), expected);
        prop_assert_eq!(engine.is_ringing(), expected == 0);
        prop_assert_eq!(engine.countdown().is_running(), expected > 0);
    }

    #[test]
    fn stopwatch_elapsed_is_monotonic(ops in prop::collection::vec((0u8..4, 0u64..20_000), 1..40)) {
        let h = Harness::new();
        let mut engine = h.engine();
        let mut last = 0;
        for (op, advance) in ops {
            h.clock.advance(advance);
            match op {
                0 => { engine.start_stopwatch(); }
                1 => { engine.pause_stopwatch(); }
                2 => { engine.lap(); }
                _ => {
                    engine.on_suspend();
                    engine = h.engine();
                    engine.restore();
                }
            }
            let elapsed = engine.stopwatch_elapsed_ms();
            prop_assert!(elapsed >= last, "elapsed went from {} to {}", last, elapsed);
            last = elapsed;
        }
    }
}
