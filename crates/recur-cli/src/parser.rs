use chrono::{NaiveDate, Weekday};
use chrono_english::{parse_date_string, Dialect};
use recur_core::{dates, lexicon, relative};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("Could not understand the date '{0}'")]
    UnknownDate(String),
    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),
}

pub fn parse_weekday(text: &str) -> Result<Weekday, ArgError> {
    lexicon::weekday(&text.trim().to_lowercase())
        .ok_or_else(|| ArgError::UnknownWeekday(text.to_string()))
}

/// Parses a date flag: an ISO date, an engine phrase ("next friday", "late
/// next month"), or anything `chrono-english` understands relative to
/// `today`.
pub fn parse_date_arg(text: &str, today: NaiveDate, week_start: Weekday) -> Result<NaiveDate, ArgError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Some(date) = relative::resolve(text, today, week_start) {
        return Ok(date);
    }
    english_date(text, today)
}

/// Last resort for phrases the engine does not know.
pub fn english_date(text: &str, today: NaiveDate) -> Result<NaiveDate, ArgError> {
    let now = dates::at_local_noon(today).ok_or_else(|| ArgError::UnknownDate(text.to_string()))?;
    parse_date_string(text, now, Dialect::Us)
        .map(|parsed| parsed.date_naive())
        .map_err(|e| {
            debug!(error = %e, text, "chrono-english could not parse date");
            ArgError::UnknownDate(text.to_string())
        })
}
