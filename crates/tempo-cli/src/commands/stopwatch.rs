use clap::Subcommand;

use super::{open_engine, print_events, print_json};

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Print current stopwatch state as JSON
    Status,
    /// Start or resume
    Start,
    /// Pause
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Record a lap (only while running)
    Lap,
    /// Zero the stopwatch and clear laps
    Reset,
    /// Log the elapsed time as a session, then reset
    Save {
        /// Task title for the record
        #[arg(long)]
        task: Option<String>,
    },
}

pub fn run(action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        StopwatchAction::Status => {}
        StopwatchAction::Start => print_events(&engine.start_stopwatch())?,
        StopwatchAction::Pause => print_events(&engine.pause_stopwatch())?,
        StopwatchAction::Toggle => print_events(&engine.toggle_stopwatch())?,
        StopwatchAction::Lap => match engine.lap() {
            Some(event) => print_json(&event)?,
            None => return Err("stopwatch is not running".into()),
        },
        StopwatchAction::Reset => print_events(&engine.reset_stopwatch())?,
        StopwatchAction::Save { task } => {
            let record = engine.save_stopwatch_session(task)?;
            print_json(&record)?;
        }
    }

    let sw = engine.stopwatch();
    print_json(&serde_json::json!({
        "elapsed_ms": engine.stopwatch_elapsed_ms(),
        "is_running": sw.is_running(),
        "laps": sw.laps(),
    }))?;
    engine.on_suspend();
    Ok(())
}
