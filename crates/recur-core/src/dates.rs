//! Calendar primitives shared by the parser, the resolver and the calculator.
//!
//! Every value here is a plain [`NaiveDate`]. A calendar date has no time of
//! day, so whole-day arithmetic can never land on the wrong side of a DST
//! switch. Hosts that need an instant can pin a date to local noon with
//! [`at_local_noon`].

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeZone, Weekday};

use crate::models::FirstOrLast;

/// Hour used when a calendar date has to become a local timestamp.
pub const NOON_HOUR: u32 = 12;

/// Longest walk needed to hit a given weekday from any date.
const WEEK_SCAN: u32 = 7;

/// Local noon as a time of day.
#[inline]
pub fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(NOON_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Today's calendar date in the local offset.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Pins a date to local noon. Returns `None` only for dates the local zone
/// cannot represent at all.
pub fn at_local_noon(date: NaiveDate) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&date.and_time(noon())).earliest()
}

/// Shifts a date by `n` whole days, or `None` past the calendar bounds.
pub fn shift_days(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    }
}

/// Shifts a date by `n` whole days. Saturates at the calendar bounds instead
/// of panicking; only for short walks inside a week or a month.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    shift_days(date, n).unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Number of days from `week_start` to `day` going forward (0..=6).
#[inline]
pub fn days_since_week_start(day: Weekday, week_start: Weekday) -> u32 {
    (day.num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7
}

/// Walks backward until the weekday matches `week_start`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = days_since_week_start(date.weekday(), week_start);
    add_days(date, -i64::from(back))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

/// Caps `desired_day` to the last day of the month (day 31 in April is 30).
pub fn clamp_day_in_month(year: i32, month: u32, desired_day: u32) -> u32 {
    desired_day.clamp(1, days_in_month(year, month))
}

/// Builds a date in the given month with the day clamped to the month end.
pub fn clamped_date(year: i32, month: u32, desired_day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, clamp_day_in_month(year, month, desired_day))
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
}

/// Month arithmetic with rollover across any number of years, both ways.
/// `month` is 1-based. `None` when the year leaves the `i32` range.
pub fn advance_month(year: i32, month: u32, step: i32) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(step);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// The `n`-th (1-based) `weekday` of the month, or `None` when the month has
/// fewer than `n` of them.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// The `n`-th `weekday` counting backward from the month's last day
/// (`n == 1` is the last one).
pub fn nth_weekday_from_end(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let last = last_day_of_month(year, month)?;
    let back = (last.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
    let day = i64::from(last.day()) - i64::from(back) - 7 * (i64::from(n) - 1);
    if day < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day as u32)
}

/// First or last non-weekend day of the month.
pub fn first_or_last_weekday_of_month(year: i32, month: u32, which: FirstOrLast) -> Option<NaiveDate> {
    let (start, step) = match which {
        FirstOrLast::First => (NaiveDate::from_ymd_opt(year, month, 1)?, 1),
        FirstOrLast::Last => (last_day_of_month(year, month)?, -1),
    };
    (0..WEEK_SCAN)
        .map(|offset| add_days(start, step * i64::from(offset)))
        .find(|date| date.month() == month && !is_weekend(*date))
}

/// Next date strictly after `date` that falls on `weekday`.
pub fn next_weekday_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = match days_since_week_start(weekday, date.weekday()) {
        0 => 7,
        n => n,
    };
    add_days(date, i64::from(ahead))
}

/// Steps forward `count` business days, never landing on a weekend.
pub fn add_business_days(date: NaiveDate, count: u32) -> Option<NaiveDate> {
    let mut current = date;
    let mut remaining = count;
    while remaining > 0 {
        current = shift_days(current, 1)?;
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    Some(current)
}
