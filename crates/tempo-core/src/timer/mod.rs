mod alarm;
mod countdown;
mod interval;
mod mode;
mod stopwatch;

pub use alarm::{AlarmController, ToneSettings, DEFAULT_REPEAT_INTERVAL_MS};
pub use countdown::{CountdownState, TickOutcome, UserSettings, MIN_ADJUSTED_SECS};
pub use interval::RepeatingTimer;
pub use mode::{Durations, Mode, Preset};
pub use stopwatch::StopwatchState;
