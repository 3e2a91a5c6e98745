use anyhow::Result;
use recur_core::recurrence::RecurrenceManager;

use crate::cli::NextCommand;
use crate::commands::schedule_context;
use crate::config::Config;

pub fn next_date(command: NextCommand, config: &Config) -> Result<()> {
    let context = schedule_context(&command.schedule, config)?;
    let text = command.text.join(" ");
    let manager = RecurrenceManager::from_text(&text, context.week_start)?;

    let next = manager.next_occurrence(&context)?;
    println!("{}", next.format("%Y-%m-%d"));
    Ok(())
}
