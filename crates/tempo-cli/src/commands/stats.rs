use clap::Subcommand;
use tempo_core::clock::to_datetime;
use tempo_core::{Clock, Config, Database, SystemClock};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            // Same day boundary the engine uses for daily progress.
            let today = to_datetime(SystemClock.now_ms()).date_naive();
            let stats = db.stats_on(&config.session.user_id, today)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
