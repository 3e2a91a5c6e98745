//! Relative date phrases ("next monday", "this weekend", "early next
//! quarter") resolved against an explicit today.
//!
//! The resolver knows nothing about recurrence rules. It returns `None` for
//! phrases it does not recognise so callers can try other date parsers.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::dates::{
    add_days, advance_month, clamped_date, days_since_week_start, next_weekday_after, noon,
    shift_days, start_of_week, NOON_HOUR,
};
use crate::lexicon::{self, COUNT, MONTH, WEEKDAY};
use crate::parser::normalize;

type Resolver = fn(&str, NaiveDateTime, Weekday) -> Option<NaiveDate>;

/// Resolver families in priority order.
const RESOLVERS: &[(&str, Resolver)] = &[
    ("literal", resolve_literal),
    ("weekend", resolve_weekend),
    ("week_span", resolve_week_span),
    ("descriptor", resolve_descriptor),
    ("period_start", resolve_period_start),
    ("offset", resolve_offset),
    ("first_of_month", resolve_first_of_month),
    ("weekday", resolve_weekday),
];

lazy_static! {
    static ref WEEKEND: Regex = Regex::new(r"^(this|next)\s+weekend$").unwrap();
    static ref END_OF_WEEK: Regex = Regex::new(r"^end\s+of\s+(?:the|this)\s+week$").unwrap();
    static ref DESCRIPTOR: Regex = Regex::new(&format!(
        r"^(early|mid|late)[\s-]+(?:in\s+)?(next\s+week|next\s+month|next\s+quarter|{MONTH})$"
    ))
    .unwrap();
    static ref PERIOD_START: Regex = Regex::new(r"^next\s+(month|quarter|year)$").unwrap();
    static ref OFFSET: Regex =
        Regex::new(&format!(r"^in\s+({COUNT}|an?)\s+(day|week)s?$")).unwrap();
    static ref FIRST_OF_MONTH: Regex =
        Regex::new(r"^(?:the\s+)?(?:first|1st)\s+of\s+(?:every|each|the|next)\s+month$").unwrap();
    static ref WEEKDAY_REF: Regex =
        Regex::new(&format!(r"^(?:(this|next)\s+)?({WEEKDAY})$")).unwrap();
}

/// Resolves a relative date phrase against `today`, treated as noon.
pub fn resolve(phrase: &str, today: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    resolve_at(phrase, today.and_time(noon()), week_start)
}

/// Resolves a relative date phrase against a local wall-clock time.
///
/// The time of day only matters for "this weekend" on a Sunday: from noon
/// on, the phrase means the coming weekend.
pub fn resolve_at(phrase: &str, now: NaiveDateTime, week_start: Weekday) -> Option<NaiveDate> {
    let text = normalize(phrase);
    if text.is_empty() {
        return None;
    }
    let found = RESOLVERS
        .iter()
        .find_map(|(family, resolver)| resolver(&text, now, week_start).map(|date| (*family, date)));
    match found {
        Some((family, date)) => {
            debug!(family, text = %text, %date, "resolved relative date");
            Some(date)
        }
        None => {
            trace!(text = %text, "no relative date pattern matched");
            None
        }
    }
}

fn resolve_literal(text: &str, now: NaiveDateTime, _: Weekday) -> Option<NaiveDate> {
    let today = now.date();
    match text {
        "today" | "tonight" | "now" => Some(today),
        "tomorrow" | "tmrw" => Some(add_days(today, 1)),
        "day after tomorrow" => Some(add_days(today, 2)),
        _ => None,
    }
}

fn resolve_weekend(text: &str, now: NaiveDateTime, week_start: Weekday) -> Option<NaiveDate> {
    let caps = WEEKEND.captures(text)?;
    let today = now.date();
    if &caps[1] == "next" {
        let next_week = add_days(start_of_week(today, week_start), 7);
        return Some(add_days(
            next_week,
            i64::from(days_since_week_start(Weekday::Sat, week_start)),
        ));
    }
    let date = match today.weekday() {
        Weekday::Sat => today,
        Weekday::Sun if now.hour() < NOON_HOUR => today,
        _ => next_weekday_after(today, Weekday::Sat),
    };
    Some(date)
}

fn resolve_week_span(text: &str, now: NaiveDateTime, week_start: Weekday) -> Option<NaiveDate> {
    let today = now.date();
    let week = start_of_week(today, week_start);
    match text {
        "this week" => Some(today),
        "next week" => Some(add_days(week, 7)),
        _ if END_OF_WEEK.is_match(text) => Some(add_days(week, 6)),
        _ => None,
    }
}

/// "early" / "mid" / "late" combined with a week, month or quarter.
fn resolve_descriptor(text: &str, now: NaiveDateTime, week_start: Weekday) -> Option<NaiveDate> {
    let caps = DESCRIPTOR.captures(text)?;
    let today = now.date();
    // position within the period: 0 early, 1 mid, 2 late
    let part: u32 = match &caps[1] {
        "early" => 0,
        "mid" => 1,
        _ => 2,
    };
    let day = 5 + 10 * part;
    let period = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");

    match period.as_str() {
        "next week" => {
            let next_week = add_days(start_of_week(today, week_start), 7);
            Some(add_days(next_week, 2 * i64::from(part)))
        }
        "next month" => {
            let (year, month) = advance_month(today.year(), today.month(), 1)?;
            clamped_date(year, month, day)
        }
        "next quarter" => {
            let quarter_start = (today.month() - 1) / 3 * 3 + 1;
            let (year, month) = advance_month(today.year(), quarter_start, 3 + part as i32)?;
            clamped_date(year, month, day)
        }
        name => {
            // the named month this year, or next year once that day has passed
            let month = u32::from(lexicon::month(name)?);
            match clamped_date(today.year(), month, day)? {
                date if date >= today => Some(date),
                _ => clamped_date(today.year().checked_add(1)?, month, day),
            }
        }
    }
}

fn resolve_period_start(text: &str, now: NaiveDateTime, _: Weekday) -> Option<NaiveDate> {
    let caps = PERIOD_START.captures(text)?;
    let today = now.date();
    let (year, month) = match &caps[1] {
        "month" => advance_month(today.year(), today.month(), 1)?,
        "quarter" => advance_month(today.year(), (today.month() - 1) / 3 * 3 + 1, 3)?,
        _ => (today.year().checked_add(1)?, 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn resolve_offset(text: &str, now: NaiveDateTime, _: Weekday) -> Option<NaiveDate> {
    let caps = OFFSET.captures(text)?;
    let n = match &caps[1] {
        "a" | "an" => 1,
        word => lexicon::count(word)?,
    };
    let days = match &caps[2] {
        "week" => 7 * i64::from(n),
        _ => i64::from(n),
    };
    shift_days(now.date(), days)
}

fn resolve_first_of_month(text: &str, now: NaiveDateTime, _: Weekday) -> Option<NaiveDate> {
    if !FIRST_OF_MONTH.is_match(text) {
        return None;
    }
    let today = now.date();
    if today.day() == 1 {
        return Some(today);
    }
    let (year, month) = advance_month(today.year(), today.month(), 1)?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// "this friday" may be today; "friday" and "next friday" never are.
fn resolve_weekday(text: &str, now: NaiveDateTime, _: Weekday) -> Option<NaiveDate> {
    let caps = WEEKDAY_REF.captures(text)?;
    let weekday = lexicon::weekday(&caps[2])?;
    let today = now.date();
    let inclusive = caps.get(1).map(|m| m.as_str()) == Some("this");
    if inclusive && today.weekday() == weekday {
        return Some(today);
    }
    Some(next_weekday_after(today, weekday))
}
