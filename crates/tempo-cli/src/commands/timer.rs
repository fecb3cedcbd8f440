use std::time::Duration;

use clap::Subcommand;
use tempo_core::{Durations, Mode, Preset};

use super::{open_engine, print_events, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Abandon the current run and move to the next mode
    Skip,
    /// Stop and reload the current mode's duration
    Reset,
    /// Silence the alarm and rotate to the next mode
    Ack,
    /// Add or remove whole minutes
    Adjust {
        /// Minutes to add (negative to remove)
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Switch mode (focus, shortBreak, longBreak)
    Mode { mode: Mode },
    /// Switch preset (pomodoro, deepWork, ultradian, custom)
    Preset { preset: Preset },
    /// Use custom durations in minutes
    Custom {
        focus: u32,
        short_break: u32,
        long_break: u32,
    },
    /// Set the alarm volume (0.0 - 1.0)
    Volume { volume: f64 },
    /// Log the current run as a partial session
    Save {
        /// Task title for the record
        #[arg(long)]
        task: Option<String>,
    },
    /// Keep the timer ticking in the foreground, printing events
    Watch {
        /// Stop after this many seconds (runs until the countdown stops if omitted)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        TimerAction::Status => {}
        TimerAction::Start => print_events(&engine.start_countdown())?,
        TimerAction::Pause => print_events(&engine.pause_countdown())?,
        TimerAction::Toggle => print_events(&engine.toggle_countdown())?,
        TimerAction::Skip => print_events(&engine.skip_to_next())?,
        TimerAction::Reset => print_events(&engine.reset_countdown())?,
        TimerAction::Ack => print_events(&engine.acknowledge_alarm())?,
        TimerAction::Adjust { minutes } => print_json(&engine.adjust_time(minutes)?)?,
        TimerAction::Mode { mode } => print_events(&engine.set_mode(mode))?,
        TimerAction::Preset { preset } => print_events(&engine.set_preset(preset))?,
        TimerAction::Custom {
            focus,
            short_break,
            long_break,
        } => {
            let durations = Durations::new(focus, short_break, long_break);
            print_events(&engine.set_custom_durations(durations)?)?;
        }
        TimerAction::Volume { volume } => print_json(&engine.set_alarm_volume(volume)?)?,
        TimerAction::Save { task } => {
            let record = engine.save_countdown_session(task)?;
            print_json(&record)?;
        }
        TimerAction::Watch { seconds } => {
            // Idle, paused and ringing all end the watch.
            let mut waited = 0;
            while engine.countdown().is_running() && seconds.map_or(true, |limit| waited < limit) {
                std::thread::sleep(Duration::from_secs(1));
                waited += 1;
                print_events(&engine.poll())?;
            }
        }
    }

    print_json(&engine.snapshot())?;
    engine.on_suspend();
    Ok(())
}
