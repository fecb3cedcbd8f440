//! Alarm controller: the ringing state and its repeating tone loop.
//!
//! Owned by one engine instance. `is_ringing` is the logical state; whether a
//! tone actually played is independent of it.

use tracing::debug;

use super::interval::RepeatingTimer;
use crate::capability::{Notifier, ToneProducer};

pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 3_000;

/// Sound settings read at the moment each tone is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSettings {
    pub enabled: bool,
    pub volume: f64,
}

pub struct AlarmController {
    tone: Box<dyn ToneProducer>,
    notifier: Box<dyn Notifier>,
    repeat: RepeatingTimer,
    repeat_interval_ms: u64,
    ringing: bool,
}

impl AlarmController {
    pub fn new(tone: Box<dyn ToneProducer>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            tone,
            notifier,
            repeat: RepeatingTimer::new(),
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            ringing: false,
        }
    }

    pub fn with_repeat_interval(mut self, interval_ms: u64) -> Self {
        self.repeat_interval_ms = interval_ms.max(1);
        self
    }

    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    /// Whether the repeat loop is armed. Always equal to `is_ringing`.
    pub fn is_looping(&self) -> bool {
        self.repeat.is_active()
    }

    /// Start ringing: one tone now, then one per repeat interval.
    ///
    /// Returns `false` (and does nothing) if already ringing. When the host is
    /// not in the foreground a notification is attempted, provided permission
    /// was granted earlier.
    pub fn activate(&mut self, now_ms: u64, settings: ToneSettings, foreground: bool, body: &str) -> bool {
        if self.ringing {
            return false;
        }
        self.ringing = true;
        self.play(settings);
        self.repeat.start(now_ms, self.repeat_interval_ms);

        if !foreground && self.notifier.is_permitted() {
            if let Err(e) = self.notifier.show("Time's up", body) {
                debug!(error = %e, "alarm notification not shown");
            }
        }
        true
    }

    /// Play the next tone if the repeat interval has elapsed.
    ///
    /// A late poll plays a single tone rather than a burst. Returns whether a
    /// tone was attempted.
    pub fn poll(&mut self, now_ms: u64, settings: ToneSettings) -> bool {
        if !self.ringing || self.repeat.take_due(now_ms) == 0 {
            return false;
        }
        self.play(settings);
        true
    }

    /// Stop ringing. Returns `false` if it was not ringing.
    pub fn deactivate(&mut self) -> bool {
        self.repeat.cancel();
        std::mem::replace(&mut self.ringing, false)
    }

    fn play(&mut self, settings: ToneSettings) {
        if !settings.enabled {
            return;
        }
        if let Err(e) = self.tone.play_tone(settings.volume.clamp(0.0, 1.0)) {
            debug!(error = %e, "alarm tone not played");
        }
    }
}
