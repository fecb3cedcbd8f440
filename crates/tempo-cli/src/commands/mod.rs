pub mod config;
pub mod stats;
pub mod stopwatch;
pub mod timer;

use std::io::Write;
use std::rc::Rc;

use serde::Serialize;
use tempo_core::capability::{NoopNotifier, NoopWakeLock};
use tempo_core::{
    Capabilities, CapabilityError, Config, Database, EngineOptions, Event, SessionEngine,
    ToneProducer,
};

/// Rings the terminal bell. Volume is ignored.
struct TerminalBell;

impl ToneProducer for TerminalBell {
    fn play_tone(&mut self, _volume: f64) -> Result<(), CapabilityError> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| CapabilityError::Failed {
                name: "terminal bell",
                message: e.to_string(),
            })
    }
}

/// Open the database and bring an engine up to date with wall-clock time.
///
/// Every invocation is a cold start: the persisted snapshots are the only
/// state carried between runs.
pub fn open_engine() -> Result<SessionEngine, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Rc::new(Database::open()?);
    let mut engine = SessionEngine::new(
        EngineOptions::from(&config),
        Box::new(Rc::clone(&db)),
        Box::new(Rc::clone(&db)),
    )
    .with_capabilities(Capabilities {
        tone: Box::new(TerminalBell),
        notifier: Box::new(NoopNotifier),
        wake_lock: Box::new(NoopWakeLock),
    });
    let restored = engine.restore();
    print_events(&restored)?;
    Ok(engine)
}

/// Events worth showing after a restore are the ones that changed something.
pub fn print_events(events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        if matches!(event, Event::StateRestored { .. }) {
            continue;
        }
        print_json(event)?;
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
