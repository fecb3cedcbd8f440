use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Next mode in the round-robin.
    ///
    /// `sessions_completed` already includes a focus round that just ended.
    /// A zero counter never earns a long break, so skipping the very first
    /// focus round leads to a short break.
    pub fn next(self, sessions_completed: u32, sessions_before_long_break: u32) -> Mode {
        match self {
            Mode::Focus => {
                let every = sessions_before_long_break.max(1);
                if sessions_completed > 0 && sessions_completed % every == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Mode::Focus),
            "shortBreak" | "short-break" | "short" => Ok(Mode::ShortBreak),
            "longBreak" | "long-break" | "long" => Ok(Mode::LongBreak),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Minutes per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub focus: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Durations {
    pub const fn new(focus: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            focus,
            short_break,
            long_break,
        }
    }

    /// Reject zero-minute entries.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("focus", self.focus),
            ("shortBreak", self.short_break),
            ("longBreak", self.long_break),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidDuration {
                    field: field.to_string(),
                    value: 0,
                });
            }
        }
        Ok(())
    }

    pub fn minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    pub fn seconds(&self, mode: Mode) -> u64 {
        u64::from(self.minutes(mode)).saturating_mul(60)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Preset::Pomodoro.durations().unwrap_or(Durations::new(25, 5, 15))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    #[default]
    Pomodoro,
    DeepWork,
    Ultradian,
    Custom,
}

impl Preset {
    /// Fixed durations for named presets; `None` for `Custom`.
    pub fn durations(self) -> Option<Durations> {
        match self {
            Preset::Pomodoro => Some(Durations::new(25, 5, 15)),
            Preset::DeepWork => Some(Durations::new(50, 10, 30)),
            Preset::Ultradian => Some(Durations::new(90, 20, 30)),
            Preset::Custom => None,
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(Preset::Pomodoro),
            "deepWork" | "deep-work" => Ok(Preset::DeepWork),
            "ultradian" => Ok(Preset::Ultradian),
            "custom" => Ok(Preset::Custom),
            other => Err(format!("unknown preset: {other}")),
        }
    }
}
