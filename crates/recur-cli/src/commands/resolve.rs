use anyhow::Result;
use recur_core::relative;
use tracing::debug;

use crate::cli::ResolveCommand;
use crate::commands::{today, week_start};
use crate::config::Config;
use crate::parser::english_date;

pub fn resolve_phrase(command: ResolveCommand, config: &Config) -> Result<()> {
    let week_start = week_start(command.week_start.as_deref(), config)?;
    let today = today(command.today.as_deref(), week_start)?;
    let phrase = command.phrase.join(" ");

    let date = match relative::resolve(&phrase, today, week_start) {
        Some(date) => date,
        None => {
            debug!(phrase = %phrase, "engine did not recognise phrase, trying chrono-english");
            english_date(&phrase, today)?
        }
    };
    println!("{}", date.format("%Y-%m-%d"));
    Ok(())
}
