//! Session engine: countdown, stopwatch, alarm and their persistence.
//!
//! The engine is single-threaded and cooperative. The host calls
//! [`SessionEngine::poll`] from its event loop (about once a second) and the
//! explicit lifecycle entry points [`SessionEngine::on_suspend`] /
//! [`SessionEngine::on_resume`] when it is hidden or shown again.
//!
//! ## Persistence
//!
//! Every mutating operation persists both snapshots and then calls the
//! state-change hook. A running countdown's `savedAtEpochMs` is the instant
//! its `remainingSeconds` was last exact (the last applied tick), so a gap in
//! polling is never lost; everything else is stamped with `now`. Resumption
//! rebuilds live state from the snapshot plus the wall-clock time spent away,
//! and re-anchors the tick timer so that a stale tick can never run against
//! rebuilt state.
//!
//! ```ignore
//! let mut engine = SessionEngine::new(EngineOptions::from(&config), store, backend);
//! engine.restore();
//! engine.start_countdown();
//! loop {
//!     for event in engine.poll() { render(&event); }
//! }
//! ```

use tracing::{info, warn};

use crate::capability::{
    NoopNotifier, NoopTone, NoopWakeLock, Notifier, ToneProducer, WakeHolder, WakeLock,
    WakeLockManager,
};
use crate::clock::{to_datetime, Clock, SystemClock};
use crate::error::{Result, ValidationError};
use crate::events::{EngineSnapshot, Event};
use crate::session::{DailyProgress, SessionBackend, SessionKind, SessionLogger, SessionRecord};
use crate::storage::snapshot::{
    decode_countdown, decode_stopwatch, decode_volume, CountdownSnapshot, StopwatchSnapshot,
    COUNTDOWN_KEY, STOPWATCH_KEY, VOLUME_KEY,
};
use crate::storage::{Config, KeyValueStore};
use crate::timer::{
    AlarmController, CountdownState, Durations, Mode, Preset, RepeatingTimer, StopwatchState,
    TickOutcome, ToneSettings, UserSettings, DEFAULT_REPEAT_INTERVAL_MS,
};

const TICK_MS: u64 = 1_000;

/// First-run defaults for a fresh engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub preset: Preset,
    pub custom_durations: Durations,
    pub settings: UserSettings,
    pub repeat_interval_ms: u64,
    pub user_id: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            custom_durations: Durations::default(),
            settings: UserSettings::default(),
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            user_id: "local".into(),
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            preset: config.timer.preset,
            custom_durations: config.custom_durations(),
            settings: config.user_settings(),
            repeat_interval_ms: config.repeat_interval_ms(),
            user_id: config.session.user_id.clone(),
        }
    }
}

/// Platform capabilities. Defaults to no-ops.
pub struct Capabilities {
    pub tone: Box<dyn ToneProducer>,
    pub notifier: Box<dyn Notifier>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            tone: Box::new(NoopTone),
            notifier: Box::new(NoopNotifier),
            wake_lock: Box::new(NoopWakeLock),
        }
    }
}

pub type StateChangeHook = Box<dyn FnMut(&EngineSnapshot)>;

pub struct SessionEngine {
    options: EngineOptions,
    clock: Box<dyn Clock>,
    store: Box<dyn KeyValueStore>,
    logger: SessionLogger,
    countdown: CountdownState,
    stopwatch: StopwatchState,
    alarm: AlarmController,
    wake: WakeLockManager,
    countdown_tick: RepeatingTimer,
    focus_minutes_today: u64,
    foreground: bool,
    on_state_change: Option<StateChangeHook>,
}

impl SessionEngine {
    /// A fresh engine with default state. Call [`restore`](Self::restore) to
    /// pick up persisted snapshots.
    pub fn new(
        options: EngineOptions,
        store: Box<dyn KeyValueStore>,
        backend: Box<dyn SessionBackend>,
    ) -> Self {
        let caps = Capabilities::default();
        let alarm = AlarmController::new(caps.tone, caps.notifier)
            .with_repeat_interval(options.repeat_interval_ms);
        Self {
            countdown: CountdownState::new(options.preset, options.custom_durations, options.settings),
            logger: SessionLogger::new(backend, options.user_id.clone()),
            options,
            clock: Box::new(SystemClock),
            store,
            stopwatch: StopwatchState::new(),
            alarm,
            wake: WakeLockManager::new(caps.wake_lock),
            countdown_tick: RepeatingTimer::new(),
            focus_minutes_today: 0,
            foreground: true,
            on_state_change: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.alarm = AlarmController::new(caps.tone, caps.notifier)
            .with_repeat_interval(self.options.repeat_interval_ms);
        self.wake = WakeLockManager::new(caps.wake_lock);
        self
    }

    /// Called synchronously after every mutating operation, once the new
    /// state has been persisted.
    pub fn with_state_change_hook(mut self, hook: impl FnMut(&EngineSnapshot) + 'static) -> Self {
        self.on_state_change = Some(Box::new(hook));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn countdown(&self) -> &CountdownState {
        &self.countdown
    }

    pub fn stopwatch(&self) -> &StopwatchState {
        &self.stopwatch
    }

    pub fn is_ringing(&self) -> bool {
        self.alarm.is_ringing()
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn alarm_is_looping(&self) -> bool {
        self.alarm.is_looping()
    }

    pub fn countdown_tick_active(&self) -> bool {
        self.countdown_tick.is_active()
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake.is_held()
    }

    pub fn stopwatch_elapsed_ms(&self) -> u64 {
        self.stopwatch.elapsed_ms(self.clock.now_ms())
    }

    pub fn daily_progress(&self) -> DailyProgress {
        DailyProgress {
            sessions_completed: self.countdown.sessions_completed(),
            focus_minutes: self.focus_minutes_today,
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.clock.now_ms();
        let s = self.countdown.settings;
        let goal = s.daily_goal_sessions.max(1);
        EngineSnapshot {
            mode: self.countdown.mode(),
            preset: self.countdown.preset(),
            remaining_secs: self.countdown.remaining_secs(),
            total_secs: self.countdown.configured_secs(),
            is_running: self.countdown.is_running(),
            is_ringing: self.alarm.is_ringing(),
            sessions_completed: self.countdown.sessions_completed(),
            focus_minutes_today: self.focus_minutes_today,
            daily_goal_sessions: s.daily_goal_sessions,
            daily_goal_progress: (f64::from(self.countdown.sessions_completed()) / f64::from(goal))
                .min(1.0),
            stopwatch_elapsed_ms: self.stopwatch.elapsed_ms(now),
            stopwatch_running: self.stopwatch.is_running(),
            laps: self.stopwatch.laps().to_vec(),
            alarm_volume: s.alarm_volume,
            sound_enabled: s.sound_enabled,
            auto_save_on_complete: s.auto_save_on_complete,
            at: to_datetime(now),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Cold start: recompute today's counters from the backend, then
    /// reconstruct from the persisted snapshots.
    pub fn restore(&mut self) -> Vec<Event> {
        self.refresh_daily_progress();
        self.on_resume()
    }

    /// Host hidden or about to unload: persist immediately.
    pub fn on_suspend(&mut self) {
        self.foreground = false;
        self.flush();
    }

    /// Host shown again: rebuild live state from the snapshots.
    pub fn on_resume(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        self.foreground = true;
        let mut events = Vec::new();

        // Anything armed before the suspension is stale.
        self.countdown_tick.cancel();

        let mut away_secs = 0;
        if let Some(raw) = self.read(COUNTDOWN_KEY) {
            match decode_countdown(&raw) {
                Some(snap) => {
                    away_secs = now.saturating_sub(snap.saved_at_epoch_ms) / 1000;
                    self.reconstruct_countdown(&snap, now, &mut events);
                }
                None => self.reset_countdown_to_defaults(),
            }
        }

        if let Some(raw) = self.read(STOPWATCH_KEY) {
            match decode_stopwatch(&raw) {
                Some(snap) => {
                    away_secs = away_secs.max(now.saturating_sub(snap.saved_at_epoch_ms) / 1000);
                    self.reconstruct_stopwatch(&snap, now);
                }
                None => self.stopwatch.reset(),
            }
        }

        if let Some(volume) = self.read(VOLUME_KEY).as_deref().and_then(decode_volume) {
            self.countdown.settings.alarm_volume = volume;
        }

        self.sync_runtime(now);
        info!(
            countdown_running = self.countdown.is_running(),
            ringing = self.alarm.is_ringing(),
            stopwatch_running = self.stopwatch.is_running(),
            away_secs,
            "state restored"
        );
        events.push(Event::StateRestored {
            countdown_running: self.countdown.is_running(),
            stopwatch_running: self.stopwatch.is_running(),
            away_secs,
            at: to_datetime(now),
        });
        self.commit(now);
        events
    }

    /// Persist everything now.
    pub fn flush(&mut self) {
        let now = self.clock.now_ms();
        self.persist(now);
    }

    /// Run due ticks and alarm repeats.
    pub fn poll(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        self.catch_up(now, &mut events);

        let tone = self.tone_settings();
        self.alarm.poll(now, tone);
        events
    }

    // ── Countdown commands ───────────────────────────────────────────

    /// No effect while ringing; acknowledge first.
    pub fn start_countdown(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        if self.alarm.is_ringing() || !self.countdown.start() {
            return Vec::new();
        }
        self.countdown_tick.start(now, TICK_MS);
        self.wake.hold(WakeHolder::Countdown);
        self.commit(now);
        vec![Event::CountdownStarted {
            mode: self.countdown.mode(),
            remaining_secs: self.countdown.remaining_secs(),
            at: to_datetime(now),
        }]
    }

    /// Ticks that came due since the last poll are applied first, so the
    /// paused value is exact even if the host stopped polling.
    pub fn pause_countdown(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        self.catch_up(now, &mut events);
        if !self.countdown.pause() {
            return events;
        }
        self.sync_runtime(now);
        self.commit(now);
        events.push(Event::CountdownPaused {
            mode: self.countdown.mode(),
            remaining_secs: self.countdown.remaining_secs(),
            at: to_datetime(now),
        });
        events
    }

    pub fn toggle_countdown(&mut self) -> Vec<Event> {
        if self.countdown.is_running() {
            self.pause_countdown()
        } else {
            self.start_countdown()
        }
    }

    /// Cancel the run, silence any alarm, and rotate to the next mode.
    pub fn skip_to_next(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let from = self.countdown.mode();
        self.alarm.deactivate();
        let to = self.countdown.skip_to_next();
        self.sync_runtime(now);
        self.commit(now);
        vec![Event::CountdownSkipped {
            from,
            to,
            at: to_datetime(now),
        }]
    }

    /// Stop and reload the current mode's duration, silencing any alarm.
    pub fn reset_countdown(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        self.alarm.deactivate();
        self.countdown.reset();
        self.sync_runtime(now);
        self.commit(now);
        vec![Event::CountdownReset {
            mode: self.countdown.mode(),
            remaining_secs: self.countdown.remaining_secs(),
            at: to_datetime(now),
        }]
    }

    pub fn adjust_time(&mut self, delta_minutes: i64) -> Result<Event, ValidationError> {
        if self.alarm.is_ringing() {
            return Err(ValidationError::AlarmRinging);
        }
        let now = self.clock.now_ms();
        let remaining_secs = self.countdown.adjust(delta_minutes);
        self.commit(now);
        Ok(Event::TimeAdjusted {
            delta_minutes,
            remaining_secs,
            at: to_datetime(now),
        })
    }

    pub fn set_mode(&mut self, mode: Mode) -> Vec<Event> {
        let mut events = self.acknowledge_alarm();
        self.countdown.set_mode(mode);
        events.push(self.mode_changed());
        events
    }

    pub fn set_preset(&mut self, preset: Preset) -> Vec<Event> {
        let mut events = self.acknowledge_alarm();
        self.countdown.set_preset(preset);
        events.push(self.mode_changed());
        events
    }

    pub fn set_custom_durations(&mut self, durations: Durations) -> Result<Vec<Event>, ValidationError> {
        durations.validate()?;
        let mut events = self.acknowledge_alarm();
        self.countdown.set_custom_durations(durations)?;
        events.push(self.mode_changed());
        Ok(events)
    }

    /// Silence the alarm and rotate: focus → long break every Nth session,
    /// otherwise short break; any break → focus. No effect when not ringing.
    pub fn acknowledge_alarm(&mut self) -> Vec<Event> {
        if !self.alarm.deactivate() {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let next_mode = self.countdown.rotate();
        self.sync_runtime(now);
        self.commit(now);
        vec![Event::AlarmAcknowledged {
            next_mode,
            duration_secs: self.countdown.remaining_secs(),
            at: to_datetime(now),
        }]
    }

    /// Log the current countdown run as a partial session, then reset it.
    pub fn save_countdown_session(&mut self, task_title: Option<String>) -> Result<SessionRecord> {
        let now = self.clock.now_ms();
        // A completion found here is reported through the state-change hook.
        self.catch_up(now, &mut Vec::new());
        if self.alarm.is_ringing() {
            return Err(ValidationError::AlarmRinging.into());
        }
        let mode = self.countdown.mode();
        let record =
            self.logger
                .log_partial_countdown(mode, self.countdown.elapsed_secs(), now, task_title)?;
        self.countdown.reset();
        self.sync_runtime(now);
        self.commit(now);
        Ok(record)
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Takes effect on the next tone of a ringing alarm.
    pub fn set_alarm_volume(&mut self, volume: f64) -> Result<Event, ValidationError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(ValidationError::InvalidVolume(volume));
        }
        self.countdown.settings.alarm_volume = volume;
        Ok(self.settings_changed())
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) -> Event {
        self.countdown.settings.sound_enabled = enabled;
        self.settings_changed()
    }

    pub fn set_auto_save(&mut self, enabled: bool) -> Event {
        self.countdown.settings.auto_save_on_complete = enabled;
        self.settings_changed()
    }

    pub fn set_daily_goal(&mut self, sessions: u32) -> Result<Event, ValidationError> {
        if sessions == 0 {
            return Err(ValidationError::InvalidDuration {
                field: "dailyGoalSessions".into(),
                value: 0,
            });
        }
        self.countdown.settings.daily_goal_sessions = sessions;
        Ok(self.settings_changed())
    }

    // ── Stopwatch commands ───────────────────────────────────────────

    pub fn start_stopwatch(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        if !self.stopwatch.start(now) {
            return Vec::new();
        }
        self.wake.hold(WakeHolder::Stopwatch);
        self.commit(now);
        vec![Event::StopwatchStarted {
            elapsed_ms: self.stopwatch.elapsed_ms(now),
            at: to_datetime(now),
        }]
    }

    pub fn pause_stopwatch(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        if !self.stopwatch.pause(now) {
            return Vec::new();
        }
        self.wake.let_go(WakeHolder::Stopwatch);
        self.commit(now);
        vec![Event::StopwatchPaused {
            elapsed_ms: self.stopwatch.elapsed_ms(now),
            at: to_datetime(now),
        }]
    }

    pub fn toggle_stopwatch(&mut self) -> Vec<Event> {
        if self.stopwatch.is_running() {
            self.pause_stopwatch()
        } else {
            self.start_stopwatch()
        }
    }

    /// Zero the stopwatch and drop its persisted snapshot.
    pub fn reset_stopwatch(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        self.stopwatch.reset();
        self.wake.let_go(WakeHolder::Stopwatch);
        self.commit(now);
        vec![Event::StopwatchReset { at: to_datetime(now) }]
    }

    /// Only while running.
    pub fn lap(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let elapsed_ms = self.stopwatch.lap(now)?;
        self.commit(now);
        Some(Event::LapRecorded {
            index: self.stopwatch.laps().len() - 1,
            elapsed_ms,
            at: to_datetime(now),
        })
    }

    /// Log the stopwatch run, then reset it.
    pub fn save_stopwatch_session(&mut self, task_title: Option<String>) -> Result<SessionRecord> {
        let now = self.clock.now_ms();
        let record = self
            .logger
            .log_stopwatch(self.stopwatch.elapsed_ms(now), now, task_title)?;
        self.reset_stopwatch();
        Ok(record)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply every countdown tick that has come due by `now`.
    fn catch_up(&mut self, now: u64, events: &mut Vec<Event>) {
        let due = self.countdown_tick.take_due(now);
        if due == 0 {
            return;
        }
        match self.countdown.tick_many(due) {
            TickOutcome::Idle => {}
            TickOutcome::Ticked => self.commit(now),
            TickOutcome::Completed(mode) => {
                self.countdown_tick.cancel();
                self.finish_countdown(mode, now, now, false, events);
                self.commit(now);
            }
        }
    }

    fn reconstruct_countdown(&mut self, snap: &CountdownSnapshot, now: u64, events: &mut Vec<Event>) {
        let mut state = snap.to_state();
        state.set_sessions_completed(self.countdown.sessions_completed());

        if !snap.is_running {
            self.alarm.deactivate();
            self.countdown = state;
            return;
        }

        if snap.remaining_seconds == 0 {
            // Finished before the snapshot was taken and never acknowledged.
            state.set_remaining(0, false);
            self.countdown = state;
            self.ring(now, true, events);
            return;
        }

        let away_secs = now.saturating_sub(snap.saved_at_epoch_ms) / 1000;
        let remaining = snap.remaining_seconds.saturating_sub(away_secs);
        self.countdown = state;
        if remaining > 0 {
            self.countdown.set_remaining(remaining, true);
            return;
        }

        // Ran out while the host was inert: the alarm fires now.
        let mode = self.countdown.mode();
        self.countdown.complete();
        let completed_at = snap
            .saved_at_epoch_ms
            .saturating_add(snap.remaining_seconds.saturating_mul(1000));
        self.finish_countdown(mode, completed_at, now, true, events);
    }

    fn reconstruct_stopwatch(&mut self, snap: &StopwatchSnapshot, now: u64) {
        self.stopwatch = if snap.is_running {
            let away = now.saturating_sub(snap.saved_at_epoch_ms);
            StopwatchState::from_parts(snap.accumulated_ms + away, Some(now), snap.laps.clone())
        } else {
            StopwatchState::from_parts(snap.accumulated_ms, None, snap.laps.clone())
        };
    }

    fn reset_countdown_to_defaults(&mut self) {
        let sessions = self.countdown.sessions_completed();
        self.countdown = CountdownState::new(
            self.options.preset,
            self.options.custom_durations,
            self.options.settings,
        );
        self.countdown.set_sessions_completed(sessions);
        self.alarm.deactivate();
    }

    /// Countdown reached zero: report, auto-save, ring.
    fn finish_countdown(
        &mut self,
        mode: Mode,
        completed_at_ms: u64,
        now: u64,
        retroactive: bool,
        events: &mut Vec<Event>,
    ) {
        info!(mode = mode.label(), retroactive, "countdown completed");
        events.push(Event::CountdownCompleted {
            mode,
            sessions_completed: self.countdown.sessions_completed(),
            at: to_datetime(completed_at_ms),
        });

        if self.countdown.settings.auto_save_on_complete {
            let durations = self.countdown.durations();
            match self
                .logger
                .log_completion(mode, &durations, completed_at_ms, None)
            {
                Ok(record) => {
                    if record.kind == SessionKind::Focus {
                        self.focus_minutes_today += u64::from(record.duration_minutes);
                    }
                    events.push(Event::SessionLogged {
                        record,
                        at: to_datetime(now),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "auto-save failed");
                    events.push(Event::SessionLogFailed {
                        kind: mode.into(),
                        reason: e.to_string(),
                        at: to_datetime(now),
                    });
                }
            }
        }

        self.ring(now, retroactive, events);
    }

    fn ring(&mut self, now: u64, retroactive: bool, events: &mut Vec<Event>) {
        let mode = self.countdown.mode();
        let body = format!("{} complete", mode.label());
        let tone = self.tone_settings();
        if self.alarm.activate(now, tone, self.foreground, &body) {
            events.push(Event::AlarmActivated {
                mode,
                retroactive,
                at: to_datetime(now),
            });
        }
    }

    /// Align the tick timer and the wake lock with the current state.
    fn sync_runtime(&mut self, now: u64) {
        if self.countdown.is_running() {
            if !self.countdown_tick.is_active() {
                self.countdown_tick.start(now, TICK_MS);
            }
            self.wake.hold(WakeHolder::Countdown);
        } else {
            self.countdown_tick.cancel();
            if self.alarm.is_ringing() {
                self.wake.hold(WakeHolder::Countdown);
            } else {
                self.wake.let_go(WakeHolder::Countdown);
            }
        }

        if self.stopwatch.is_running() {
            self.wake.hold(WakeHolder::Stopwatch);
        } else {
            self.wake.let_go(WakeHolder::Stopwatch);
        }
    }

    fn tone_settings(&self) -> ToneSettings {
        ToneSettings {
            enabled: self.countdown.settings.sound_enabled,
            volume: self.countdown.settings.alarm_volume,
        }
    }

    fn refresh_daily_progress(&mut self) {
        let today = to_datetime(self.clock.now_ms()).date_naive();
        match self.logger.todays_progress(today) {
            Ok(progress) => {
                self.countdown
                    .set_sessions_completed(progress.sessions_completed);
                self.focus_minutes_today = progress.focus_minutes;
            }
            Err(e) => warn!(error = %e, "could not load today's sessions"),
        }
    }

    fn mode_changed(&mut self) -> Event {
        let now = self.clock.now_ms();
        self.sync_runtime(now);
        self.commit(now);
        Event::ModeChanged {
            mode: self.countdown.mode(),
            preset: self.countdown.preset(),
            remaining_secs: self.countdown.remaining_secs(),
            at: to_datetime(now),
        }
    }

    fn settings_changed(&mut self) -> Event {
        let now = self.clock.now_ms();
        self.commit(now);
        Event::SettingsChanged { at: to_datetime(now) }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "snapshot read failed");
                None
            }
        }
    }

    fn commit(&mut self, now: u64) {
        self.persist(now);
        if let Some(mut hook) = self.on_state_change.take() {
            hook(&self.snapshot());
            self.on_state_change = Some(hook);
        }
    }

    /// A running countdown is stamped with its last applied tick, not `now`:
    /// ticks still pending at save time are then recovered on resume.
    fn persist(&self, now: u64) {
        let countdown_saved_at = if self.countdown.is_running() {
            self.countdown_tick.last_due_ms().unwrap_or(now)
        } else {
            now
        };
        let countdown =
            CountdownSnapshot::capture(&self.countdown, self.alarm.is_ringing(), countdown_saved_at);
        self.write_json(COUNTDOWN_KEY, &countdown);

        if self.stopwatch == StopwatchState::default() {
            if let Err(e) = self.store.remove(STOPWATCH_KEY) {
                warn!(key = STOPWATCH_KEY, error = %e, "snapshot remove failed");
            }
        } else {
            self.write_json(STOPWATCH_KEY, &StopwatchSnapshot::capture(&self.stopwatch, now));
        }

        let volume = self.countdown.settings.alarm_volume.to_string();
        if let Err(e) = self.store.set(VOLUME_KEY, &volume) {
            warn!(key = VOLUME_KEY, error = %e, "snapshot write failed");
        }
    }

    fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(key, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(key, error = %e, "snapshot write failed");
        }
    }
}
