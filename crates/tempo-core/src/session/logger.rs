//! Turns finished or partial runs into session records.
//!
//! Logging never touches timer state. A failed write is returned to the
//! caller; the engine's own state stays authoritative.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NewSession, SessionBackend, SessionKind, SessionRecord};
use crate::clock::to_datetime;
use crate::error::{BackendError, Result, ValidationError};
use crate::timer::{Durations, Mode};

const MS_PER_MINUTE: u64 = 60_000;

/// Today's completed focus work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub sessions_completed: u32,
    pub focus_minutes: u64,
}

pub struct SessionLogger {
    backend: Box<dyn SessionBackend>,
    user_id: String,
}

impl SessionLogger {
    pub fn new(backend: Box<dyn SessionBackend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
        }
    }

    /// A countdown that ran to zero: logged at its configured length.
    pub fn log_completion(
        &self,
        mode: Mode,
        durations: &Durations,
        completed_at_ms: u64,
        task_title: Option<String>,
    ) -> Result<SessionRecord> {
        let minutes = durations.minutes(mode);
        self.insert(mode.into(), minutes, true, completed_at_ms, task_title)
    }

    /// A countdown saved mid-run: elapsed rounded to whole minutes.
    pub fn log_partial_countdown(
        &self,
        mode: Mode,
        elapsed_secs: u64,
        now_ms: u64,
        task_title: Option<String>,
    ) -> Result<SessionRecord> {
        let elapsed_ms = elapsed_secs.saturating_mul(1000);
        let minutes = round_minutes(elapsed_ms);
        if minutes < 1 {
            return Err(ValidationError::SessionTooShort { elapsed_ms }.into());
        }
        self.insert(mode.into(), minutes, false, now_ms, task_title)
    }

    /// A stopwatch run. Anything under one minute is rejected.
    pub fn log_stopwatch(
        &self,
        elapsed_ms: u64,
        now_ms: u64,
        task_title: Option<String>,
    ) -> Result<SessionRecord> {
        if elapsed_ms < MS_PER_MINUTE {
            return Err(ValidationError::SessionTooShort { elapsed_ms }.into());
        }
        let minutes = round_minutes(elapsed_ms);
        self.insert(SessionKind::Stopwatch, minutes, true, now_ms, task_title)
    }

    pub fn todays_progress(&self, today: NaiveDate) -> std::result::Result<DailyProgress, BackendError> {
        let records = self.backend.query_todays_sessions(&self.user_id, today)?;
        let mut progress = DailyProgress::default();
        for r in records
            .iter()
            .filter(|r| r.kind == SessionKind::Focus && r.is_completed)
        {
            progress.sessions_completed += 1;
            progress.focus_minutes += u64::from(r.duration_minutes);
        }
        Ok(progress)
    }

    fn insert(
        &self,
        kind: SessionKind,
        minutes: u32,
        is_completed: bool,
        completed_at_ms: u64,
        task_title: Option<String>,
    ) -> Result<SessionRecord> {
        let completed_at = to_datetime(completed_at_ms);
        let session = NewSession {
            user_id: self.user_id.clone(),
            duration_minutes: minutes,
            kind,
            is_completed,
            task_title: task_title.filter(|t| !t.trim().is_empty()),
            started_at: completed_at - Duration::minutes(i64::from(minutes)),
            completed_at,
        };
        let record = self.backend.insert_session(&session)?;
        info!(id = record.id, kind = kind.as_str(), minutes, "session logged");
        Ok(record)
    }
}

fn round_minutes(ms: u64) -> u32 {
    let minutes = (ms + MS_PER_MINUTE / 2) / MS_PER_MINUTE;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
