//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer preset and custom durations
//! - Long-break cadence and daily goal
//! - Alarm sound, volume and repeat interval
//! - Session auto-save and user identity
//!
//! Configuration is stored at `<data_dir>/config.toml`. It seeds a first
//! run only: once a countdown snapshot exists, the snapshot's settings win.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{Durations, Preset, UserSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default)]
    pub preset: Preset,
    /// Custom focus minutes (used when `preset = "custom"`).
    #[serde(default = "default_focus")]
    pub focus: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    #[serde(default = "default_daily_goal")]
    pub daily_goal_sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub auto_save_on_complete: bool,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_focus() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_before_long_break() -> u32 {
    4
}
fn default_daily_goal() -> u32 {
    8
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    0.5
}
fn default_repeat_interval() -> u64 {
    3
}
fn default_user_id() -> String {
    "local".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            focus: default_focus(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            sessions_before_long_break: default_sessions_before_long_break(),
            daily_goal_sessions: default_daily_goal(),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: default_volume(),
            repeat_interval_secs: default_repeat_interval(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_save_on_complete: true,
            user_id: default_user_id(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot replace a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk, writing defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update one value in memory. The result must still validate.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Update one value and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.custom_durations()
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "timer".into(),
                message: e.to_string(),
            })?;
        let positive = [
            ("timer.sessions_before_long_break", u64::from(self.timer.sessions_before_long_break)),
            ("timer.daily_goal_sessions", u64::from(self.timer.daily_goal_sessions)),
            ("alarm.repeat_interval_secs", self.alarm.repeat_interval_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.alarm.volume) {
            return Err(ConfigError::InvalidValue {
                key: "alarm.volume".into(),
                message: format!("{} is outside 0.0..=1.0", self.alarm.volume),
            });
        }
        Ok(())
    }

    pub fn custom_durations(&self) -> Durations {
        Durations::new(self.timer.focus, self.timer.short_break, self.timer.long_break)
    }

    pub fn user_settings(&self) -> UserSettings {
        UserSettings {
            sound_enabled: self.alarm.sound_enabled,
            auto_save_on_complete: self.session.auto_save_on_complete,
            daily_goal_sessions: self.timer.daily_goal_sessions,
            alarm_volume: self.alarm.volume,
            sessions_before_long_break: self.timer.sessions_before_long_break,
        }
    }

    pub fn repeat_interval_ms(&self) -> u64 {
        self.alarm.repeat_interval_secs.saturating_mul(1000)
    }
}
