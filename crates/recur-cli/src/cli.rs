use clap::{Args, Parser, Subcommand};

/// Parse plain-English repeat rules and work out when they fall next
#[derive(Parser, Debug)]
#[command(name = "recur", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show how a repeat rule is understood
    Parse(ParseCommand),
    /// Print the next date of a repeat rule
    Next(NextCommand),
    /// List upcoming dates of a repeat rule
    Preview(PreviewCommand),
    /// Turn a relative date phrase into a date
    Resolve(ResolveCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ParseCommand {
    /// The repeat rule, e.g. "every other tuesday"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Print the structured rule as JSON
    #[arg(long)]
    pub json: bool,
    /// First day of the week (monday, sunday, ...)
    #[arg(long)]
    pub week_start: Option<String>,
}

/// Flags shared by every command that computes dates from a rule.
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Current due date of the series (defaults to today)
    #[arg(long, help = "Current due date: ISO date or phrase like 'next friday'")]
    pub from: Option<String>,
    /// Date to treat as today
    #[arg(long, help = "Date to treat as today (defaults to the local date)")]
    pub today: Option<String>,
    /// Advance from today instead of from the due date
    #[arg(long)]
    pub completion: bool,
    /// First day of the week (monday, sunday, ...)
    #[arg(long)]
    pub week_start: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NextCommand {
    /// The repeat rule
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// The repeat rule
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Number of dates to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveCommand {
    /// The phrase, e.g. "this weekend" or "early next quarter"
    #[arg(required = true, num_args = 1..)]
    pub phrase: Vec<String>,
    /// Date to treat as today
    #[arg(long)]
    pub today: Option<String>,
    /// First day of the week (monday, sunday, ...)
    #[arg(long)]
    pub week_start: Option<String>,
}
