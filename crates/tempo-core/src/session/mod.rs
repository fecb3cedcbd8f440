//! Session records and the backend that stores them.
//!
//! Records are immutable once created; this crate never updates or deletes them.

mod logger;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::timer::Mode;

pub use logger::{DailyProgress, SessionLogger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
    Stopwatch,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "shortBreak",
            SessionKind::LongBreak => "longBreak",
            SessionKind::Stopwatch => "stopwatch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "focus" => Some(SessionKind::Focus),
            "shortBreak" => Some(SessionKind::ShortBreak),
            "longBreak" => Some(SessionKind::LongBreak),
            "stopwatch" => Some(SessionKind::Stopwatch),
            _ => None,
        }
    }
}

impl From<Mode> for SessionKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Focus => SessionKind::Focus,
            Mode::ShortBreak => SessionKind::ShortBreak,
            Mode::LongBreak => SessionKind::LongBreak,
        }
    }
}

/// A session about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub user_id: String,
    pub duration_minutes: u32,
    pub kind: SessionKind,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: String,
    pub duration_minutes: u32,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
}

/// Durable record storage owned by the host.
pub trait SessionBackend {
    fn insert_session(&self, session: &NewSession) -> Result<SessionRecord, BackendError>;

    /// Records for `user_id` completed on `today` (UTC).
    fn query_todays_sessions(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<SessionRecord>, BackendError>;
}

impl<T: SessionBackend + ?Sized> SessionBackend for Rc<T> {
    fn insert_session(&self, session: &NewSession) -> Result<SessionRecord, BackendError> {
        (**self).insert_session(session)
    }

    fn query_todays_sessions(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<SessionRecord>, BackendError> {
        (**self).query_todays_sessions(user_id, today)
    }
}

/// In-process backend for tests and embedding. Writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RefCell<Vec<SessionRecord>>,
    fail_writes: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.records.borrow().clone()
    }
}

impl SessionBackend for MemoryBackend {
    fn insert_session(&self, session: &NewSession) -> Result<SessionRecord, BackendError> {
        if self.fail_writes.get() {
            return Err(BackendError::WriteFailed("backend unavailable".into()));
        }
        let mut records = self.records.borrow_mut();
        let record = SessionRecord {
            id: records.len() as i64 + 1,
            user_id: session.user_id.clone(),
            duration_minutes: session.duration_minutes,
            kind: session.kind,
            started_at: session.started_at,
            completed_at: session.completed_at,
            is_completed: session.is_completed,
            task_title: session.task_title.clone(),
        };
        records.push(record.clone());
        Ok(record)
    }

    fn query_todays_sessions(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<SessionRecord>, BackendError> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|r| r.user_id == user_id && r.completed_at.date_naive() == today)
            .cloned()
            .collect())
    }
}
