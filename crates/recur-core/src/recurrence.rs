use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, trace, warn};

use crate::dates::{
    add_business_days, advance_month, clamped_date, days_since_week_start,
    first_or_last_weekday_of_month, last_day_of_month, nth_weekday_from_end,
    nth_weekday_of_month, shift_days, start_of_week,
};
use crate::error::CoreError;
use crate::models::{
    AdvanceFrom, DayOrLast, Ordinal, RecurrenceContext, RecurrenceRule, WeekdaySet,
};
use crate::parser;

/// Upper bound on catch-up steps when the computed date is still in the past.
pub const MAX_CATCH_UP_STEPS: u8 = 36;

/// Upper bound on months visited while looking for a monthly occurrence.
pub const MAX_MONTH_SCAN: u32 = 48;

/// Upper bound on years visited while looking for a yearly occurrence.
pub const MAX_YEAR_SCAN: i32 = 8;

/// Computes the next occurrence of `rule` that is not before `context.today`.
///
/// # Arguments
/// * `rule` - The structured rule
/// * `context` - Anchor, today, week start and advance policy
/// * `depth` - Catch-up steps already spent (0 for a fresh call)
///
/// # Returns
/// * `Ok(date)` - The next occurrence, never earlier than today
/// * `Err(CoreError::NoOccurrence)` - The bounded scan found no candidate
/// * `Err(CoreError::CatchUpExhausted)` - The series is too far behind
///
/// # Behavior
/// - Base is today for `AdvanceFrom::Completion`, otherwise the anchor
///   (today when there is none)
/// - A candidate earlier than today becomes the new base and the search
///   continues, at most `MAX_CATCH_UP_STEPS` times
/// - Rules that take a default (day of month, month) from the anchor take it
///   from the current base, so the default follows each catch-up step
pub fn compute_next(
    rule: &RecurrenceRule,
    context: &RecurrenceContext,
    depth: u8,
) -> Result<NaiveDate, CoreError> {
    rule.validate()?;

    let mut base = context.base();
    let mut step = depth;
    loop {
        if step >= MAX_CATCH_UP_STEPS {
            warn!(kind = rule.kind(), steps = step, last = %base, "catch-up exhausted");
            return Err(CoreError::CatchUpExhausted { steps: step, last: base });
        }
        let candidate = next_after(rule, base, context.week_start)?;
        if candidate >= context.today {
            debug!(kind = rule.kind(), %base, next = %candidate, steps = step, "computed next occurrence");
            return Ok(candidate);
        }
        trace!(step, %candidate, today = %context.today, "candidate is in the past, catching up");
        base = candidate;
        step += 1;
    }
}

/// [`compute_next`] reduced to "a date or nothing".
pub fn next_date(rule: &RecurrenceRule, context: &RecurrenceContext) -> Option<NaiveDate> {
    compute_next(rule, context, 0).ok()
}

/// Parses `text` and computes its next occurrence in one go.
pub fn parse_and_compute(text: &str, context: &RecurrenceContext) -> Result<NaiveDate, CoreError> {
    let rule = parser::parse(text, context.week_start).ok_or_else(|| {
        CoreError::InvalidInput(format!("Could not understand this recurrence: '{}'", text.trim()))
    })?;
    compute_next(&rule, context, 0)
}

/// The first occurrence of `rule` strictly after `base`, with no regard for
/// today.
pub fn next_after(
    rule: &RecurrenceRule,
    base: NaiveDate,
    week_start: Weekday,
) -> Result<NaiveDate, CoreError> {
    let out_of_range = || CoreError::NoOccurrence(rule.to_string());
    match rule {
        RecurrenceRule::Daily { interval } => {
            shift_days(base, i64::from(*interval)).ok_or_else(out_of_range)
        }
        RecurrenceRule::Weekday => add_business_days(base, 1).ok_or_else(out_of_range),
        RecurrenceRule::BusinessDaily { interval } => {
            add_business_days(base, *interval).ok_or_else(out_of_range)
        }
        RecurrenceRule::Weekly { interval, by_day } => {
            next_weekly(base, *interval, *by_day, week_start).ok_or_else(out_of_range)
        }
        RecurrenceRule::MonthlyDay { interval, day } => {
            let desired = day.map(u32::from).unwrap_or_else(|| base.day());
            scan_months(rule, base, *interval, |year, month| {
                clamped_date(year, month, desired).into_iter().collect()
            })
        }
        RecurrenceRule::MonthlyNth { interval, nth, weekday } => {
            scan_months(rule, base, *interval, |year, month| {
                nth_in_month(year, month, *nth, *weekday).into_iter().collect()
            })
        }
        RecurrenceRule::MonthlyLastDay => scan_months(rule, base, 1, |year, month| {
            last_day_of_month(year, month).into_iter().collect()
        }),
        RecurrenceRule::MonthlyMultiDay { days } => scan_months(rule, base, 1, |year, month| {
            days.iter().filter_map(|day| day_in_month(year, month, *day)).collect()
        }),
        RecurrenceRule::MonthlyMixedDay { days, include_last } => {
            scan_months(rule, base, 1, |year, month| {
                let mut dates: Vec<NaiveDate> = days
                    .iter()
                    .filter_map(|day| clamped_date(year, month, u32::from(*day)))
                    .collect();
                if *include_last {
                    dates.extend(last_day_of_month(year, month));
                }
                dates
            })
        }
        RecurrenceRule::MonthlyMultiNth { ordinals, weekday } => {
            scan_months(rule, base, 1, |year, month| {
                ordinals
                    .iter()
                    .filter_map(|nth| nth_in_month(year, month, *nth, *weekday))
                    .collect()
            })
        }
        RecurrenceRule::MonthlyNthFromEnd { n, weekday } => {
            let n = u8::try_from(*n).unwrap_or(u8::MAX);
            scan_months(rule, base, 1, |year, month| {
                nth_weekday_from_end(year, month, *weekday, n).into_iter().collect()
            })
        }
        RecurrenceRule::MonthlyNthWeekday { which } => scan_months(rule, base, 1, |year, month| {
            first_or_last_weekday_of_month(year, month, *which).into_iter().collect()
        }),
        RecurrenceRule::Yearly { month, day } => {
            let month = month.map(u32::from).unwrap_or_else(|| base.month());
            let day = day.map(u32::from).unwrap_or_else(|| base.day());
            scan_years(rule, base, |year| clamped_date(year, month, day))
        }
        RecurrenceRule::YearlyNth { month, nth, weekday } => scan_years(rule, base, |year| {
            nth_in_month(year, u32::from(*month), *nth, *weekday)
        }),
    }
}

fn nth_in_month(year: i32, month: u32, nth: Ordinal, weekday: Weekday) -> Option<NaiveDate> {
    match nth.position() {
        Some(n) => nth_weekday_of_month(year, month, weekday, n),
        None => nth_weekday_from_end(year, month, weekday, 1),
    }
}

fn day_in_month(year: i32, month: u32, day: DayOrLast) -> Option<NaiveDate> {
    match day {
        DayOrLast::Day(day) => clamped_date(year, month, u32::from(day)),
        DayOrLast::Last => last_day_of_month(year, month),
    }
}

/// Earliest selected day after `base`, in the base's week or, failing that,
/// in the week `interval` weeks later. `None` past the calendar bounds.
fn next_weekly(
    base: NaiveDate,
    interval: u32,
    by_day: Option<WeekdaySet>,
    week_start: Weekday,
) -> Option<NaiveDate> {
    let jump = 7 * i64::from(interval);
    let days = match by_day {
        Some(days) if !days.is_empty() => days,
        _ => return shift_days(base, jump),
    };

    let at = |week: NaiveDate, day: Weekday| {
        shift_days(week, i64::from(days_since_week_start(day, week_start)))
    };

    let week = start_of_week(base, week_start);
    let this_week = days
        .iter_from(week_start)
        .filter_map(|day| at(week, day))
        .find(|d| *d > base);
    if this_week.is_some() {
        return this_week;
    }
    let later = shift_days(week, jump)?;
    let first = days.iter_from(week_start).next();
    match first {
        Some(day) => at(later, day),
        None => Some(later),
    }
}

/// Visits the base month and then every `interval`-th month after it,
/// returning the earliest candidate strictly after `base`.
fn scan_months<F>(
    rule: &RecurrenceRule,
    base: NaiveDate,
    interval: u32,
    mut candidates: F,
) -> Result<NaiveDate, CoreError>
where
    F: FnMut(i32, u32) -> Vec<NaiveDate>,
{
    let step = i32::try_from(interval).unwrap_or(i32::MAX);
    let (mut year, mut month) = (base.year(), base.month());
    for _ in 0..MAX_MONTH_SCAN {
        if let Some(found) = candidates(year, month).into_iter().filter(|d| *d > base).min() {
            return Ok(found);
        }
        trace!(year, month, "no occurrence in month");
        match advance_month(year, month, step) {
            Some(next) => (year, month) = next,
            None => break,
        }
    }
    Err(CoreError::NoOccurrence(rule.to_string()))
}

fn scan_years<F>(rule: &RecurrenceRule, base: NaiveDate, mut candidate: F) -> Result<NaiveDate, CoreError>
where
    F: FnMut(i32) -> Option<NaiveDate>,
{
    (0..MAX_YEAR_SCAN)
        .filter_map(|offset| base.year().checked_add(offset).and_then(&mut candidate))
        .find(|d| *d > base)
        .ok_or_else(|| CoreError::NoOccurrence(rule.to_string()))
}

/// RecurrenceManager: a validated rule plus the operations callers run on it.
///
/// Responsibilities:
/// 1. Reject inconsistent rules up front
/// 2. Compute the next occurrence for a context
/// 3. Preview several upcoming occurrences by feeding each result back in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceManager {
    rule: RecurrenceRule,
}

impl RecurrenceManager {
    pub fn new(rule: RecurrenceRule) -> Result<Self, CoreError> {
        rule.validate()?;
        Ok(Self { rule })
    }

    /// Parses rule text; unparseable text is an `InvalidInput` error.
    pub fn from_text(text: &str, week_start: Weekday) -> Result<Self, CoreError> {
        let rule = parser::parse(text, week_start).ok_or_else(|| {
            CoreError::InvalidInput(format!("Could not understand this recurrence: '{}'", text.trim()))
        })?;
        Self::new(rule)
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn next_occurrence(&self, context: &RecurrenceContext) -> Result<NaiveDate, CoreError> {
        compute_next(&self.rule, context, 0)
    }

    /// Up to `count` upcoming occurrences, each computed from the previous
    /// one as the new due date.
    ///
    /// An error on the first occurrence is returned; a later one ends the
    /// preview early.
    pub fn preview_occurrences(
        &self,
        context: &RecurrenceContext,
        count: usize,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        let mut result = Vec::with_capacity(count);
        let mut context = *context;
        for _ in 0..count {
            match compute_next(&self.rule, &context, 0) {
                Ok(next) => {
                    result.push(next);
                    context = context.with_anchor(next).advancing_from(AdvanceFrom::Due);
                }
                Err(e) if result.is_empty() => return Err(e),
                Err(e) => {
                    debug!(error = %e, produced = result.len(), "preview ended early");
                    break;
                }
            }
        }
        Ok(result)
    }
}
