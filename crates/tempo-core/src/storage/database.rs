//! SQLite-based session storage and key-value snapshots.
//!
//! Provides persistent storage for:
//! - Session records (focus, breaks, stopwatch runs)
//! - Today's statistics
//! - Key-value store for engine snapshots

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::kv::KeyValueStore;
use crate::error::{BackendError, CoreError, StorageError};
use crate::session::{NewSession, SessionBackend, SessionKind, SessionRecord};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub focus_sessions: u64,
    pub focus_min: u64,
    pub break_min: u64,
    pub stopwatch_min: u64,
    pub partial_sessions: u64,
}

/// SQLite database for sessions and engine snapshots.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/tempo.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, CoreError> {
        Self::open_at(&data_dir()?.join("tempo.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id       TEXT NOT NULL,
                kind          TEXT NOT NULL,
                duration_min  INTEGER NOT NULL,
                started_at    TEXT NOT NULL,
                completed_at  TEXT NOT NULL,
                is_completed  INTEGER NOT NULL,
                task_title    TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user_completed_at ON sessions(user_id, completed_at);",
        )?;
        Ok(())
    }

    /// Insert a session and return the stored record.
    pub fn record_session(&self, session: &NewSession) -> Result<SessionRecord, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO sessions (user_id, kind, duration_min, started_at, completed_at, is_completed, task_title)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.user_id,
                session.kind.as_str(),
                session.duration_minutes,
                session.started_at.to_rfc3339(),
                session.completed_at.to_rfc3339(),
                session.is_completed,
                session.task_title,
            ],
        )?;
        Ok(SessionRecord {
            id: self.conn.last_insert_rowid(),
            user_id: session.user_id.clone(),
            duration_minutes: session.duration_minutes,
            kind: session.kind,
            started_at: session.started_at,
            completed_at: session.completed_at,
            is_completed: session.is_completed,
            task_title: session.task_title.clone(),
        })
    }

    pub fn sessions_on(&self, user_id: &str, day: NaiveDate) -> Result<Vec<SessionRecord>, rusqlite::Error> {
        let (from, to) = day_bounds(day);
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, kind, duration_min, started_at, completed_at, is_completed, task_title
             FROM sessions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3
             ORDER BY completed_at",
        )?;
        let rows = stmt.query_map(params![user_id, from, to], row_to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn stats_on(&self, user_id: &str, day: NaiveDate) -> Result<Stats, rusqlite::Error> {
        let mut stats = Stats::default();
        for r in self.sessions_on(user_id, day)? {
            stats.total_sessions += 1;
            let minutes = u64::from(r.duration_minutes);
            if !r.is_completed {
                stats.partial_sessions += 1;
            }
            match r.kind {
                SessionKind::Focus => {
                    if r.is_completed {
                        stats.focus_sessions += 1;
                    }
                    stats.focus_min += minutes;
                }
                SessionKind::ShortBreak | SessionKind::LongBreak => stats.break_min += minutes,
                SessionKind::Stopwatch => stats.stopwatch_min += minutes,
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Ok(self.kv_remove(key)?)
    }
}

impl SessionBackend for Database {
    fn insert_session(&self, session: &NewSession) -> Result<SessionRecord, BackendError> {
        self.record_session(session)
            .map_err(|e| BackendError::WriteFailed(e.to_string()))
    }

    fn query_todays_sessions(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<SessionRecord>, BackendError> {
        self.sessions_on(user_id, today)
            .map_err(|e| BackendError::ReadFailed(e.to_string()))
    }
}

fn day_bounds(day: NaiveDate) -> (String, String) {
    let next = day.succ_opt().unwrap_or(day);
    (
        format!("{day}T00:00:00+00:00"),
        format!("{next}T00:00:00+00:00"),
    )
}

fn parse_time(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn row_to_record(row: &Row<'_>) -> Result<SessionRecord, rusqlite::Error> {
    let kind_raw: String = row.get(2)?;
    let kind = SessionKind::parse(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown session kind: {kind_raw}").into(),
        )
    })?;
    let started: String = row.get(4)?;
    let completed: String = row.get(5)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        duration_minutes: row.get(3)?,
        started_at: parse_time(4, &started)?,
        completed_at: parse_time(5, &completed)?,
        is_completed: row.get(6)?,
        task_title: row.get(7)?,
    })
}
