use clap::Parser;
use owo_colors::{OwoColorize, Style};
use recur_core::error::CoreError;
use tracing_subscriber::EnvFilter;

use crate::parser::ArgError;

mod cli;
mod commands;
mod config;
mod parser;
mod views;

const LOG_ENV: &str = "RECUR_LOG";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = config::Config::load_or_default();

    let result = match cli.command {
        cli::Commands::Parse(command) => commands::parse::parse_rule(command, &config),
        cli::Commands::Next(command) => commands::next::next_date(command, &config),
        cli::Commands::Preview(command) => commands::preview::preview_dates(command, &config),
        cli::Commands::Resolve(command) => commands::resolve::resolve_phrase(command, &config),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::InvalidInput(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::CatchUpExhausted { steps, last } => {
                eprintln!(
                    "{} Series is too far behind: still in the past after {} steps (last candidate {}).",
                    "Error:".style(error_style),
                    steps,
                    last.yellow()
                );
                eprintln!("Move the due date forward with --from, or use --completion.");
            }
            CoreError::NoOccurrence(rule) => {
                eprintln!(
                    "{} No upcoming date exists for '{}'",
                    "Error:".style(error_style),
                    rule.yellow()
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else if let Some(arg_error) = err.downcast_ref::<ArgError>() {
        eprintln!("{} {}", "Error:".style(error_style), arg_error);
        if let ArgError::UnknownDate(_) = arg_error {
            eprintln!("Dates can be YYYY-MM-DD or phrases like 'next friday' or 'early next month'.");
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
