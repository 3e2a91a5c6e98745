use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dates::days_in_month;
use crate::error::CoreError;

/// Largest repeat interval a rule may carry, in its own unit.
pub const MAX_INTERVAL: u32 = 1000;

/// Which occurrence of a weekday inside a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Ordinal {
    /// 1-based position from the start of the month; `None` for `Last`.
    pub fn position(self) -> Option<u8> {
        match self {
            Ordinal::First => Some(1),
            Ordinal::Second => Some(2),
            Ordinal::Third => Some(3),
            Ordinal::Fourth => Some(4),
            Ordinal::Last => None,
        }
    }

    pub fn from_position(n: u8) -> Option<Self> {
        match n {
            1 => Some(Ordinal::First),
            2 => Some(Ordinal::Second),
            3 => Some(Ordinal::Third),
            4 => Some(Ordinal::Fourth),
            _ => None,
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinal::Last => f.write_str("last"),
            other => f.write_str(&ordinal_suffix(u32::from(other.position().unwrap_or(0)))),
        }
    }
}

/// A day of the month, or the month's last day whatever its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOrLast {
    Day(u8),
    Last,
}

impl fmt::Display for DayOrLast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOrLast::Day(day) => f.write_str(&ordinal_suffix(u32::from(*day))),
            DayOrLast::Last => f.write_str("last day"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstOrLast {
    First,
    Last,
}

/// Where the next calculation starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceFrom {
    /// From the previous due date.
    #[default]
    Due,
    /// From the day the task was completed (today).
    Completion,
}

/// A set of weekdays stored as a bitmask (bit 0 = Monday).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const WORKDAYS: WeekdaySet = WeekdaySet(0b0001_1111);
    pub const WEEKEND: WeekdaySet = WeekdaySet(0b0110_0000);

    pub fn single(day: Weekday) -> Self {
        WeekdaySet(1 << day.num_days_from_monday())
    }

    /// Returns `true` if the day was not already present.
    pub fn insert(&mut self, day: Weekday) -> bool {
        let bit = 1 << day.num_days_from_monday();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in Monday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.iter_from(Weekday::Mon)
    }

    /// Members in week order starting at `week_start`.
    pub fn iter_from(&self, week_start: Weekday) -> impl Iterator<Item = Weekday> + '_ {
        std::iter::successors(Some(week_start), |day| Some(day.succ()))
            .take(7)
            .filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}

/// A structured repeat pattern. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceRule {
    Daily {
        interval: u32,
    },
    /// Every day that is not a Saturday or Sunday.
    Weekday,
    BusinessDaily {
        interval: u32,
    },
    /// `by_day == None` keeps the anchor's weekday.
    Weekly {
        interval: u32,
        by_day: Option<WeekdaySet>,
    },
    /// `day == None` takes the anchor's day of month when computing.
    MonthlyDay {
        interval: u32,
        day: Option<u8>,
    },
    MonthlyNth {
        interval: u32,
        nth: Ordinal,
        weekday: Weekday,
    },
    MonthlyLastDay,
    MonthlyMultiDay {
        days: BTreeSet<DayOrLast>,
    },
    MonthlyMixedDay {
        days: Vec<u8>,
        include_last: bool,
    },
    MonthlyMultiNth {
        ordinals: Vec<Ordinal>,
        weekday: Weekday,
    },
    /// `n == 1` is the last `weekday`, `n == 2` the one before it.
    MonthlyNthFromEnd {
        n: u32,
        weekday: Weekday,
    },
    /// First or last business day of the month.
    MonthlyNthWeekday {
        which: FirstOrLast,
    },
    /// Missing fields are taken from the anchor when computing.
    Yearly {
        month: Option<u8>,
        day: Option<u8>,
    },
    YearlyNth {
        month: u8,
        nth: Ordinal,
        weekday: Weekday,
    },
}

impl RecurrenceRule {
    /// Short machine name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecurrenceRule::Daily { .. } => "daily",
            RecurrenceRule::Weekday => "weekday",
            RecurrenceRule::BusinessDaily { .. } => "business_daily",
            RecurrenceRule::Weekly { .. } => "weekly",
            RecurrenceRule::MonthlyDay { .. } => "monthly_day",
            RecurrenceRule::MonthlyNth { .. } => "monthly_nth",
            RecurrenceRule::MonthlyLastDay => "monthly_last_day",
            RecurrenceRule::MonthlyMultiDay { .. } => "monthly_multi_day",
            RecurrenceRule::MonthlyMixedDay { .. } => "monthly_mixed_day",
            RecurrenceRule::MonthlyMultiNth { .. } => "monthly_multi_nth",
            RecurrenceRule::MonthlyNthFromEnd { .. } => "monthly_nth_from_end",
            RecurrenceRule::MonthlyNthWeekday { .. } => "monthly_nth_weekday",
            RecurrenceRule::Yearly { .. } => "yearly",
            RecurrenceRule::YearlyNth { .. } => "yearly_nth",
        }
    }

    /// Checks that the rule is self-consistent.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| Err(CoreError::InvalidRule(reason));
        match self {
            RecurrenceRule::Daily { interval }
            | RecurrenceRule::BusinessDaily { interval }
            | RecurrenceRule::Weekly { interval, .. }
            | RecurrenceRule::MonthlyDay { interval, .. }
            | RecurrenceRule::MonthlyNth { interval, .. }
                if *interval == 0 =>
            {
                invalid(format!("{} interval must be at least 1", self.kind()))
            }
            RecurrenceRule::Daily { interval }
            | RecurrenceRule::BusinessDaily { interval }
            | RecurrenceRule::Weekly { interval, .. }
            | RecurrenceRule::MonthlyDay { interval, .. }
            | RecurrenceRule::MonthlyNth { interval, .. }
                if *interval > MAX_INTERVAL =>
            {
                invalid(format!("{} interval {interval} is above {MAX_INTERVAL}", self.kind()))
            }
            RecurrenceRule::Weekly { by_day: Some(days), .. } if days.is_empty() => {
                invalid("weekly rule has an empty day set".to_string())
            }
            RecurrenceRule::MonthlyDay { day: Some(day), .. } if !is_day_of_month(*day) => {
                invalid(format!("day {day} is outside 1..=31"))
            }
            RecurrenceRule::MonthlyMultiDay { days } => {
                if days.is_empty() {
                    return invalid("monthly day list is empty".to_string());
                }
                match days.iter().find(|d| matches!(d, DayOrLast::Day(n) if !is_day_of_month(*n))) {
                    Some(bad) => invalid(format!("day {bad:?} is outside 1..=31")),
                    None => Ok(()),
                }
            }
            RecurrenceRule::MonthlyMixedDay { days, include_last } => {
                if days.is_empty() && !include_last {
                    return invalid("monthly day list is empty".to_string());
                }
                match days.iter().find(|d| !is_day_of_month(**d)) {
                    Some(bad) => invalid(format!("day {bad} is outside 1..=31")),
                    None => Ok(()),
                }
            }
            RecurrenceRule::MonthlyMultiNth { ordinals, .. } if ordinals.is_empty() => {
                invalid("ordinal list is empty".to_string())
            }
            RecurrenceRule::MonthlyNthFromEnd { n, .. } if !(1..=5).contains(n) => {
                invalid(format!("position {n} from the end is outside 1..=5"))
            }
            RecurrenceRule::Yearly { month, day } => {
                if let Some(month) = month {
                    if !(1..=12).contains(month) {
                        return invalid(format!("month {month} is outside 1..=12"));
                    }
                }
                match (month, day) {
                    (_, Some(day)) if !is_day_of_month(*day) => {
                        invalid(format!("day {day} is outside 1..=31"))
                    }
                    // leap year, so Feb 29 stays representable
                    (Some(month), Some(day)) if u32::from(*day) > days_in_month(2000, u32::from(*month)) => {
                        invalid(format!("{} has no day {day}", month_abbrev(*month)))
                    }
                    _ => Ok(()),
                }
            }
            RecurrenceRule::YearlyNth { month, .. } if !(1..=12).contains(month) => {
                invalid(format!("month {month} is outside 1..=12"))
            }
            _ => Ok(()),
        }
    }
}

fn is_day_of_month(day: u8) -> bool {
    (1..=31).contains(&day)
}

pub(crate) fn ordinal_suffix(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

pub(crate) fn month_abbrev(month: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    NAMES.get(usize::from(month.saturating_sub(1))).copied().unwrap_or("???")
}

fn join_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn every(interval: u32, unit: &str) -> String {
    if interval == 1 {
        format!("every {unit}")
    } else {
        format!("every {interval} {unit}s")
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::Daily { interval } => f.write_str(&every(*interval, "day")),
            RecurrenceRule::Weekday => f.write_str("every weekday"),
            RecurrenceRule::BusinessDaily { interval } => {
                f.write_str(&every(*interval, "business day"))
            }
            RecurrenceRule::Weekly { interval, by_day } => {
                f.write_str(&every(*interval, "week"))?;
                if let Some(days) = by_day {
                    let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                    write!(f, " on {}", join_and(&names))?;
                }
                Ok(())
            }
            RecurrenceRule::MonthlyDay { interval, day } => {
                f.write_str(&every(*interval, "month"))?;
                if let Some(day) = day {
                    write!(f, " on the {}", ordinal_suffix(u32::from(*day)))?;
                }
                Ok(())
            }
            RecurrenceRule::MonthlyNth { interval, nth, weekday } => {
                write!(f, "{} on the {nth} {weekday}", every(*interval, "month"))
            }
            RecurrenceRule::MonthlyLastDay => f.write_str("every month on the last day"),
            RecurrenceRule::MonthlyMultiDay { days } => {
                let names: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                write!(f, "every month on the {}", join_and(&names))
            }
            RecurrenceRule::MonthlyMixedDay { days, include_last } => {
                let mut names: Vec<String> =
                    days.iter().map(|d| ordinal_suffix(u32::from(*d))).collect();
                if *include_last {
                    names.push("last day".to_string());
                }
                write!(f, "every month on the {}", join_and(&names))
            }
            RecurrenceRule::MonthlyMultiNth { ordinals, weekday } => {
                let names: Vec<String> = ordinals.iter().map(|o| o.to_string()).collect();
                write!(f, "every month on the {} {weekday}", join_and(&names))
            }
            RecurrenceRule::MonthlyNthFromEnd { n, weekday } => match n {
                1 => write!(f, "every month on the last {weekday}"),
                n => write!(f, "every month on the {}-to-last {weekday}", ordinal_suffix(*n)),
            },
            RecurrenceRule::MonthlyNthWeekday { which } => match which {
                FirstOrLast::First => f.write_str("every month on the first weekday"),
                FirstOrLast::Last => f.write_str("every month on the last weekday"),
            },
            RecurrenceRule::Yearly { month, day } => match (month, day) {
                (Some(month), Some(day)) => {
                    write!(f, "every year on {} {day}", month_abbrev(*month))
                }
                (Some(month), None) => write!(f, "every year in {}", month_abbrev(*month)),
                _ => f.write_str("every year"),
            },
            RecurrenceRule::YearlyNth { month, nth, weekday } => {
                write!(f, "every year on the {nth} {weekday} of {}", month_abbrev(*month))
            }
        }
    }
}

/// Everything a single next-date calculation needs besides the rule.
///
/// Built fresh for every call; the engine keeps no state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceContext {
    /// The caller's notion of "today".
    pub today: NaiveDate,
    /// The task's current due/start/defer date.
    pub anchor: Option<NaiveDate>,
    pub week_start: Weekday,
    pub advance_from: AdvanceFrom,
}

impl RecurrenceContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            anchor: None,
            week_start: Weekday::Mon,
            advance_from: AdvanceFrom::Due,
        }
    }

    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn advancing_from(mut self, advance_from: AdvanceFrom) -> Self {
        self.advance_from = advance_from;
        self
    }

    /// The date the next calculation advances from.
    pub fn base(&self) -> NaiveDate {
        match self.advance_from {
            AdvanceFrom::Completion => self.today,
            AdvanceFrom::Due => self.anchor.unwrap_or(self.today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_set_iteration_order() {
        let set: WeekdaySet = [Weekday::Fri, Weekday::Mon, Weekday::Sun].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Weekday::Mon, Weekday::Fri, Weekday::Sun]);
        assert_eq!(
            set.iter_from(Weekday::Sun).collect::<Vec<_>>(),
            vec![Weekday::Sun, Weekday::Mon, Weekday::Fri]
        );
    }

    #[test]
    fn test_weekday_set_insert_reports_duplicates() {
        let mut set = WeekdaySet::EMPTY;
        assert!(set.insert(Weekday::Tue));
        assert!(!set.insert(Weekday::Tue));
        assert_eq!(set, WeekdaySet::single(Weekday::Tue));
        assert_eq!(WeekdaySet::WORKDAYS.len(), 5);
        assert!(WeekdaySet::WEEKEND.contains(Weekday::Sat));
    }

    #[test]
    fn test_day_or_last_ordering() {
        let days: BTreeSet<DayOrLast> =
            [DayOrLast::Last, DayOrLast::Day(15), DayOrLast::Day(1)].into_iter().collect();
        assert_eq!(
            days.into_iter().collect::<Vec<_>>(),
            vec![DayOrLast::Day(1), DayOrLast::Day(15), DayOrLast::Last]
        );
    }

    #[test]
    fn test_validate_rejects_inconsistent_rules() {
        assert!(RecurrenceRule::Daily { interval: 0 }.validate().is_err());
        assert!(RecurrenceRule::Daily { interval: MAX_INTERVAL }.validate().is_ok());
        assert!(RecurrenceRule::Weekly { interval: MAX_INTERVAL + 1, by_day: None }
            .validate()
            .is_err());
        assert!(RecurrenceRule::MonthlyDay { interval: 1, day: Some(32) }.validate().is_err());
        assert!(RecurrenceRule::Yearly { month: Some(2), day: Some(30) }.validate().is_err());
        assert!(RecurrenceRule::Yearly { month: Some(2), day: Some(29) }.validate().is_ok());
        assert!(RecurrenceRule::MonthlyNthFromEnd { n: 6, weekday: Weekday::Mon }.validate().is_err());
        assert!(RecurrenceRule::MonthlyMixedDay { days: vec![], include_last: false }
            .validate()
            .is_err());
        assert!(RecurrenceRule::Weekly { interval: 1, by_day: Some(WeekdaySet::EMPTY) }
            .validate()
            .is_err());
    }

    #[test]
    fn test_display_descriptions() {
        let rule = RecurrenceRule::Weekly {
            interval: 2,
            by_day: Some(WeekdaySet::single(Weekday::Tue)),
        };
        assert_eq!(rule.to_string(), "every 2 weeks on Tue");

        let rule = RecurrenceRule::MonthlyMultiNth {
            ordinals: vec![Ordinal::Second, Ordinal::Last],
            weekday: Weekday::Fri,
        };
        assert_eq!(rule.to_string(), "every month on the 2nd and last Fri");

        let rule = RecurrenceRule::Yearly { month: Some(3), day: Some(15) };
        assert_eq!(rule.to_string(), "every year on Mar 15");

        let rule = RecurrenceRule::MonthlyNthFromEnd { n: 2, weekday: Weekday::Thu };
        assert_eq!(rule.to_string(), "every month on the 2nd-to-last Thu");
    }

    #[test]
    fn test_serde_shape() {
        let rule = RecurrenceRule::MonthlyDay { interval: 3, day: Some(31) };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "monthly_day");
        assert_eq!(json["interval"], 3);

        let weekly: RecurrenceRule = serde_json::from_str(
            r#"{"kind":"weekly","interval":1,"by_day":["Mon","Fri"]}"#,
        )
        .unwrap();
        assert_eq!(
            weekly,
            RecurrenceRule::Weekly {
                interval: 1,
                by_day: Some([Weekday::Mon, Weekday::Fri].into_iter().collect()),
            }
        );
    }

    #[test]
    fn test_context_base_selection() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let ctx = RecurrenceContext::new(today).with_anchor(due);
        assert_eq!(ctx.base(), due);
        assert_eq!(ctx.advancing_from(AdvanceFrom::Completion).base(), today);
        assert_eq!(RecurrenceContext::new(today).base(), today);
    }
}
