mod config;
pub mod database;
pub mod kv;
pub mod snapshot;

pub use config::{AlarmConfig, Config, SessionConfig, TimerConfig};
pub use database::{Database, Stats};
pub use kv::{KeyValueStore, MemoryStore};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `TEMPO_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/tempo[-dev]/`, with the `-dev` suffix when `TEMPO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TEMPO_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TEMPO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tempo-dev")
            } else {
                base_dir.join("tempo")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
