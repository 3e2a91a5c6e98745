use anyhow::Result;
use owo_colors::OwoColorize;
use recur_core::recurrence::RecurrenceManager;

use crate::cli::PreviewCommand;
use crate::commands::schedule_context;
use crate::config::Config;
use crate::views::table::display_occurrences;

pub fn preview_dates(command: PreviewCommand, config: &Config) -> Result<()> {
    let context = schedule_context(&command.schedule, config)?;
    let text = command.text.join(" ");
    let manager = RecurrenceManager::from_text(&text, context.week_start)?;
    let count = command.count.unwrap_or(config.preview_count);

    let dates = manager.preview_occurrences(&context, count)?;
    println!("{} {}", "↻".cyan(), manager.rule().to_string().bold());
    display_occurrences(&dates, context.today);
    Ok(())
}
