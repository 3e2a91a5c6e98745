use anyhow::Result;
use recur_core::recurrence::RecurrenceManager;

use crate::cli::ParseCommand;
use crate::commands::week_start;
use crate::config::Config;
use crate::views::table::display_rule;

pub fn parse_rule(command: ParseCommand, config: &Config) -> Result<()> {
    let week_start = week_start(command.week_start.as_deref(), config)?;
    let text = command.text.join(" ");
    let manager = RecurrenceManager::from_text(&text, week_start)?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(manager.rule())?);
    } else {
        display_rule(&text, manager.rule());
    }
    Ok(())
}
