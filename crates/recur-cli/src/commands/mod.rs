pub mod next;
pub mod parse;
pub mod preview;
pub mod resolve;

use anyhow::Result;
use chrono::{NaiveDate, Weekday};
use recur_core::dates::today_local;
use recur_core::models::{AdvanceFrom, RecurrenceContext};
use tracing::debug;

use crate::cli::ScheduleArgs;
use crate::config::Config;
use crate::parser::{parse_date_arg, parse_weekday};

/// The `--week-start` flag when given, else the configured week start.
pub fn week_start(flag: Option<&str>, config: &Config) -> Result<Weekday> {
    match flag {
        Some(name) => Ok(parse_weekday(name)?),
        None => Ok(config.week_start()),
    }
}

/// The `--today` flag when given, else the local date.
pub fn today(flag: Option<&str>, week_start: Weekday) -> Result<NaiveDate> {
    let local = today_local();
    match flag {
        Some(text) => Ok(parse_date_arg(text, local, week_start)?),
        None => Ok(local),
    }
}

/// Builds the calculation context from the shared schedule flags, with
/// flags taking precedence over configuration.
pub fn schedule_context(args: &ScheduleArgs, config: &Config) -> Result<RecurrenceContext> {
    let week_start = week_start(args.week_start.as_deref(), config)?;
    let today = today(args.today.as_deref(), week_start)?;
    let advance_from = if args.completion {
        AdvanceFrom::Completion
    } else {
        config.advance_from
    };

    let mut context = RecurrenceContext::new(today)
        .with_week_start(week_start)
        .advancing_from(advance_from);
    if let Some(from) = args.from.as_deref() {
        context = context.with_anchor(parse_date_arg(from, today, week_start)?);
    }
    debug!(?context, "built schedule context");
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            week_start: "sunday".to_string(),
            advance_from: AdvanceFrom::Due,
            preview_count: 5,
        };
        let args = ScheduleArgs {
            from: Some("2024-01-01".to_string()),
            today: Some("2024-01-10".to_string()),
            completion: true,
            week_start: Some("saturday".to_string()),
        };

        let context = schedule_context(&args, &config).unwrap();
        assert_eq!(context.week_start, Weekday::Sat);
        assert_eq!(context.advance_from, AdvanceFrom::Completion);
        assert_eq!(context.anchor, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(context.today, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = Config {
            week_start: "sunday".to_string(),
            advance_from: AdvanceFrom::Completion,
            preview_count: 5,
        };
        let context = schedule_context(&ScheduleArgs::default(), &config).unwrap();
        assert_eq!(context.week_start, Weekday::Sun);
        assert_eq!(context.advance_from, AdvanceFrom::Completion);
        assert_eq!(context.anchor, None);
    }

    #[test]
    fn test_bad_week_start_flag_is_an_error() {
        let args = ScheduleArgs { week_start: Some("someday".to_string()), ..ScheduleArgs::default() };
        assert!(schedule_context(&args, &Config::default()).is_err());
    }
}
