//! # Tempo Core Library
//!
//! The focus-timer and stopwatch session engine behind the `tempo` CLI.
//! It keeps accurate remaining/elapsed time across backgrounding, process
//! suspension and full reloads by persisting small snapshots and rebuilding
//! live state from them with wall-clock deltas.
//!
//! ## Architecture
//!
//! - **Countdown / Stopwatch**: pure state machines in [`timer`]
//! - **Alarm Controller**: owns the ringing state and its repeating tone loop
//! - **Session Engine**: the coordinator; persists on every mutation and
//!   reconstructs on [`SessionEngine::on_resume`]
//! - **Session Logger**: turns finished or manually saved runs into records
//! - **Storage**: SQLite kv + session tables, TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: the engine instance a host drives
//! - [`Database`]: key-value snapshots and session persistence
//! - [`Config`]: application configuration management
//! - [`ToneProducer`], [`Notifier`], [`WakeLock`]: optional platform capabilities

pub mod capability;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use capability::{Notifier, ToneProducer, WakeLock, WakeLockHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Capabilities, EngineOptions, SessionEngine};
pub use error::{BackendError, CapabilityError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::{EngineSnapshot, Event};
pub use session::{MemoryBackend, SessionBackend, SessionKind, SessionLogger, SessionRecord};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Stats};
pub use timer::{AlarmController, CountdownState, Durations, Mode, Preset, StopwatchState};
