//! Natural-language repeat rules to [`RecurrenceRule`].
//!
//! The parser is an ordered table of matcher families. Families are tried
//! top to bottom and the first one that recognises the text wins, so the
//! table order decides ambiguous inputs and must not be rearranged.

use std::collections::BTreeSet;

use chrono::Weekday;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::lexicon::{self, COUNT, DAY_NUMBER, MONTH, ORDINAL, WEEKDAY};
use crate::models::{DayOrLast, FirstOrLast, Ordinal, RecurrenceRule, WeekdaySet};

type Matcher = fn(&str, Weekday) -> Option<RecurrenceRule>;

/// Matcher families in priority order.
const MATCHERS: &[(&str, Matcher)] = &[
    ("weekday_set", match_weekday_set),
    ("fixed_interval", match_fixed_interval),
    ("daily", match_daily),
    ("weekday_anchor", match_weekday_anchor),
    ("single_weekday", match_single_weekday),
    ("weekly", match_weekly),
    ("monthly", match_monthly),
    ("multi_month", match_multi_month),
    ("yearly", match_yearly),
];

/// Leading words that monthly forms may carry.
const MONTHLY_LEAD: &str = r"(?:(?:every|each)\s+month\s+on\s+|monthly\s+on\s+|on\s+|every\s+|each\s+)?";

/// Trailing words that tie a form to every month.
const MONTHLY_TAIL: &str = r"(?:\s+(?:day\s+)?(?:of|in)\s+(?:the|each|every|a)\s+month|\s+monthly|\s+(?:of\s+)?(?:every|each)\s+month)?";

lazy_static! {
    static ref WRAPPERS: Regex = Regex::new(r"\[\[|\]\]|\(\(|\)\)|\{\{|\}\}").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref LEAD_KEYWORD: Regex =
        Regex::new(r"^(?:repeat:|repeats?\s+|recur(?:s|ring)?\s+)").unwrap();

    static ref ORDINAL_HINT: Regex =
        Regex::new(r"\d|\b(?:first|second|third|fourth|fifth|last|other|penultimate)\b").unwrap();
    static ref LIST_LEAD: Regex = Regex::new(r"^(?:(?:every|each|on)\s+)?(.+)$").unwrap();
    static ref RANGE_WORD: Regex = Regex::new(r"\s+(?:through|thru|to|till|until)\s+").unwrap();
    static ref RANGE_DASH: Regex = Regex::new(r"\s*-\s*").unwrap();
    static ref LIST_SPLIT: Regex = Regex::new(r"[\s,/&]+").unwrap();

    static ref QUARTERLY: Regex = Regex::new(&format!(
        r"^(?:quarterly|(?:every|each)\s+quarter)(?:\s+on\s+(?:the\s+)?({DAY_NUMBER}))?$"
    ))
    .unwrap();
    static ref SEMIANNUAL: Regex = Regex::new(&format!(
        r"^(?:semi-?annual(?:ly)?|bi-?annual(?:ly)?|half-?yearly|twice\s+(?:a|per|each)\s+year|twice\s+yearly|(?:every|each)\s+half[\s-]year)(?:\s+on\s+(?:the\s+)?({DAY_NUMBER}))?$"
    ))
    .unwrap();

    static ref DAILY: Regex =
        Regex::new(r"^(?:daily|every\s*day|each\s+day|once\s+a\s+day)$").unwrap();
    static ref EVERY_N_DAYS: Regex =
        Regex::new(&format!(r"^(?:every|each)\s+({COUNT})\s+days?$")).unwrap();
    static ref EVERY_STEP_DAY: Regex =
        Regex::new(r"^every\s+(other|second|third|fourth|fifth)\s+day$").unwrap();

    static ref WEEKDAYS: Regex =
        Regex::new(r"^(?:(?:every|each|on)\s+)?week\s*days?$").unwrap();
    static ref WEEKENDS: Regex =
        Regex::new(r"^(?:(?:every|each|on)\s+)?(?:the\s+)?weekends?$").unwrap();
    static ref BUSINESS_DAYS: Regex =
        Regex::new(r"^(?:(?:every|each|on)\s+)?(?:business|work(?:ing)?)\s*days?$").unwrap();
    static ref EVERY_N_BUSINESS_DAYS: Regex = Regex::new(&format!(
        r"^every\s+({COUNT}|other)\s+(?:business|work(?:ing)?)\s*days?$"
    ))
    .unwrap();

    static ref ONE_WEEKDAY: Regex =
        Regex::new(&format!(r"^(?:(?:every|each|on)\s+)?({WEEKDAY})$")).unwrap();
    static ref OTHER_WEEKDAY: Regex =
        Regex::new(&format!(r"^(?:every|each)\s+other\s+({WEEKDAY})$")).unwrap();
    static ref EVERY_N_WEEKDAYS: Regex =
        Regex::new(&format!(r"^every\s+({COUNT})\s+({WEEKDAY})$")).unwrap();

    static ref WEEKLY: Regex =
        Regex::new(r"^(?:weekly|(?:every|each)\s+week|once\s+a\s+week)(?:\s+on\s+(.+))?$").unwrap();
    static ref BIWEEKLY: Regex = Regex::new(
        r"^(?:bi-?weekly|fortnightly|every\s+fortnight|every\s+other\s+week|(?:every|each)\s+two\s+weeks)(?:\s+on\s+(.+))?$"
    )
    .unwrap();
    static ref EVERY_N_WEEKS: Regex =
        Regex::new(&format!(r"^every\s+({COUNT})\s+weeks?(?:\s+on\s+(.+))?$")).unwrap();
    static ref DAYS_EVERY_WEEK: Regex = Regex::new(&format!(
        r"^(?:on\s+)?(.+?)\s+(?:(?:every|each)\s+(week|other\s+week|fortnight|({COUNT})\s+weeks?)|(bi-?weekly|fortnightly|weekly))$"
    ))
    .unwrap();
    static ref WEEK_EDGE_DAY: Regex = Regex::new(
        r"^(?:(?:every|each)\s+week\s+on\s+|weekly\s+on\s+)the\s+(first|last)\s+day(?:\s+of\s+the\s+week)?$"
    )
    .unwrap();
    static ref WEEK_EDGE: Regex =
        Regex::new(r"^(?:the\s+)?(start|end)\s+of\s+(?:every|each|the)\s+week$").unwrap();

    static ref MONTHLY: Regex =
        Regex::new(r"^(?:monthly|(?:every|each)\s+month|once\s+a\s+month)$").unwrap();
    static ref MONTH_END: Regex = Regex::new(
        r"^(?:(?:(?:every|each)\s+month\s+on\s+|monthly\s+on\s+|on\s+)?(?:the\s+)?(?:last\s+day|end)\s+of\s+(?:(?:the|each|every|a)\s+)?month|(?:(?:every|each)\s+month|monthly)\s+on\s+the\s+last\s+day|(?:monthly\s+)?(?:on\s+)?(?:month[\s-]end|eom))$"
    )
    .unwrap();
    static ref MONTH_DAYS: Regex =
        Regex::new(&format!(r"^{MONTHLY_LEAD}(?:the\s+)?(.+?){MONTHLY_TAIL}$")).unwrap();
    static ref MONTHLY_CONTEXT: Regex = Regex::new(r"\bmonth(?:ly)?\b").unwrap();
    static ref DAY_LIST_SPLIT: Regex = Regex::new(r"\s*(?:,|&|\band\b)\s*").unwrap();
    static ref EDGE_WEEKDAY: Regex = Regex::new(&format!(
        r"^{MONTHLY_LEAD}(?:the\s+)?(first|last)\s+(?:weekday|business\s+day|work(?:ing)?\s*day){MONTHLY_TAIL}$"
    ))
    .unwrap();
    static ref FROM_END: Regex = Regex::new(&format!(
        r"^{MONTHLY_LEAD}(?:the\s+)?(penultimate|(?:second|next|third|fourth|[2-5](?:nd|rd|th))[\s-]to[\s-]last)\s+({WEEKDAY}){MONTHLY_TAIL}$"
    ))
    .unwrap();
    static ref MULTI_NTH: Regex = Regex::new(&format!(
        r"^{MONTHLY_LEAD}(?:the\s+)?({ORDINAL}(?:(?:\s*,\s*(?:and\s+)?|\s+and\s+|\s*&\s*)(?:the\s+)?{ORDINAL})+)\s+({WEEKDAY}){MONTHLY_TAIL}$"
    ))
    .unwrap();
    static ref ORDINAL_WORD: Regex = Regex::new(ORDINAL).unwrap();
    static ref ONE_NTH: Regex = Regex::new(&format!(
        r"^{MONTHLY_LEAD}(?:the\s+)?({ORDINAL})\s+({WEEKDAY}){MONTHLY_TAIL}$"
    ))
    .unwrap();

    static ref EVERY_N_MONTHS: Regex = Regex::new(&format!(
        r"^(?:every|each)\s+({COUNT}|other)\s+months?(?:\s+on\s+(?:the\s+)?(.+))?$"
    ))
    .unwrap();
    static ref BIMONTHLY: Regex =
        Regex::new(r"^bi-?monthly(?:\s+on\s+(?:the\s+)?(.+))?$").unwrap();
    static ref NTH_WEEKDAY_TAIL: Regex =
        Regex::new(&format!(r"^({ORDINAL})\s+({WEEKDAY})$")).unwrap();
    static ref LAST_DAY_TAIL: Regex = Regex::new(r"^last(?:\s+day)?$").unwrap();

    static ref YEARLY: Regex =
        Regex::new(r"^(?:annually|yearly|(?:every|each)\s+year|once\s+a\s+year)$").unwrap();
    static ref YEARLY_FORM: Regex = Regex::new(
        r"^(?:(?:annually|yearly|(?:every|each)\s+year)\s+(?:on\s+)?|every\s+|each\s+|on\s+)?(?:the\s+)?(.+?)(\s+(?:every|each)\s+year|\s+annually|\s+yearly)?$"
    )
    .unwrap();
    static ref YEARLY_PREFIX: Regex =
        Regex::new(r"^(?:annually|yearly|(?:every|each)\s+year)\b").unwrap();
    static ref MONTH_THEN_DAY: Regex =
        Regex::new(&format!(r"^({MONTH})\.?\s+({DAY_NUMBER})$")).unwrap();
    static ref DAY_THEN_MONTH: Regex =
        Regex::new(&format!(r"^({DAY_NUMBER})\s+(?:of\s+)?({MONTH})$")).unwrap();
    static ref IN_MONTH: Regex = Regex::new(&format!(r"^(?:in\s+)?({MONTH})$")).unwrap();
    static ref NTH_OF_MONTH: Regex = Regex::new(&format!(
        r"^({ORDINAL})\s+({WEEKDAY})\s+(?:of|in)\s+({MONTH})$"
    ))
    .unwrap();
}

/// Canonical form of rule text: trimmed, single-spaced, lowercase, without
/// link/embed brackets, a leading "repeat"/"recurring" keyword, or trailing
/// periods.
pub fn normalize(text: &str) -> String {
    let unwrapped = WRAPPERS.replace_all(text, " ");
    let collapsed = SPACES.replace_all(unwrapped.trim(), " ").to_lowercase();
    let stripped = LEAD_KEYWORD.replace(&collapsed, "");
    stripped.trim().trim_end_matches('.').trim().to_string()
}

/// Parses rule text into a [`RecurrenceRule`].
///
/// Returns `None` when no matcher family recognises the text; a returned rule
/// always passes [`RecurrenceRule::validate`].
pub fn parse(text: &str, week_start: Weekday) -> Option<RecurrenceRule> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    for (family, matcher) in MATCHERS {
        if let Some(rule) = matcher(&text, week_start) {
            if rule.validate().is_err() {
                trace!(family, text = %text, "matcher produced an inconsistent rule, ignoring");
                continue;
            }
            debug!(family, kind = rule.kind(), text = %text, "parsed recurrence rule");
            return Some(rule);
        }
    }
    trace!(text = %text, "no recurrence pattern matched");
    None
}

fn weekly(interval: u32, days: Option<WeekdaySet>) -> Option<RecurrenceRule> {
    (interval >= 1).then_some(RecurrenceRule::Weekly { interval, by_day: days })
}

/// Parses "mon, wed and fri", "tue/thu", "monday-friday" or "fri thru mon".
fn weekday_list(text: &str) -> Option<WeekdaySet> {
    let text = RANGE_WORD.replace_all(text, "-");
    let text = RANGE_DASH.replace_all(&text, "-");
    let mut days = WeekdaySet::EMPTY;
    for token in LIST_SPLIT.split(&text) {
        match token {
            "" | "and" | "or" => continue,
            token => match token.split_once('-') {
                Some((from, to)) => {
                    let from = lexicon::weekday(from)?;
                    let to = lexicon::weekday(to)?;
                    let mut day = from;
                    days.insert(day);
                    while day != to {
                        day = day.succ();
                        days.insert(day);
                    }
                }
                None => {
                    days.insert(lexicon::weekday(token)?);
                }
            },
        }
    }
    (!days.is_empty()).then_some(days)
}

/// Family 1: day-letter shorthand and loose weekday lists. Skipped when the
/// text carries an ordinal or a number, so "the 2nd friday" is never read
/// as a list.
fn match_weekday_set(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if ORDINAL_HINT.is_match(text) {
        return None;
    }
    let body = LIST_LEAD.captures(text)?.get(1)?.as_str();

    let is_word = body.chars().all(|c| c.is_ascii_alphabetic());
    if is_word && (2..=7).contains(&body.len()) && lexicon::weekday(body).is_none() {
        if let Some(days) = lexicon::day_letters(body) {
            if days.len() >= 2 {
                return weekly(1, Some(days.into_iter().collect()));
            }
        }
    }

    let days = weekday_list(body)?;
    if days.len() < 2 {
        return None;
    }
    weekly(1, Some(days))
}

/// Family 2: keyword intervals counted in months.
fn match_fixed_interval(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    let (interval, caps) = if let Some(caps) = QUARTERLY.captures(text) {
        (3, caps)
    } else {
        (6, SEMIANNUAL.captures(text)?)
    };
    let day = match caps.get(1) {
        Some(day) => Some(lexicon::day_of_month(day.as_str(), true)?),
        None => None,
    };
    Some(RecurrenceRule::MonthlyDay { interval, day })
}

/// Family 3: daily variants.
fn match_daily(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if DAILY.is_match(text) {
        return Some(RecurrenceRule::Daily { interval: 1 });
    }
    let interval = if let Some(caps) = EVERY_N_DAYS.captures(text) {
        lexicon::count(&caps[1])?
    } else {
        lexicon::step_word(&EVERY_STEP_DAY.captures(text)?[1])?
    };
    (interval >= 1).then_some(RecurrenceRule::Daily { interval })
}

/// Family 4: weekdays, weekends and business days.
fn match_weekday_anchor(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if WEEKDAYS.is_match(text) {
        return Some(RecurrenceRule::Weekday);
    }
    if WEEKENDS.is_match(text) {
        return weekly(1, Some(WeekdaySet::WEEKEND));
    }
    if BUSINESS_DAYS.is_match(text) {
        return Some(RecurrenceRule::BusinessDaily { interval: 1 });
    }
    let caps = EVERY_N_BUSINESS_DAYS.captures(text)?;
    let interval = lexicon::step_word(&caps[1]).or_else(|| lexicon::count(&caps[1]))?;
    (interval >= 1).then_some(RecurrenceRule::BusinessDaily { interval })
}

/// Family 5: one weekday, optionally every other / every N of them.
fn match_single_weekday(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if let Some(caps) = ONE_WEEKDAY.captures(text) {
        return weekly(1, Some(WeekdaySet::single(lexicon::weekday(&caps[1])?)));
    }
    if let Some(caps) = OTHER_WEEKDAY.captures(text) {
        return weekly(2, Some(WeekdaySet::single(lexicon::weekday(&caps[1])?)));
    }
    let caps = EVERY_N_WEEKDAYS.captures(text)?;
    let interval = lexicon::count(&caps[1])?;
    weekly(interval, Some(WeekdaySet::single(lexicon::weekday(&caps[2])?)))
}

/// Family 6: week-based forms with optional day lists.
fn match_weekly(text: &str, week_start: Weekday) -> Option<RecurrenceRule> {
    if let Some(caps) = WEEK_EDGE_DAY.captures(text) {
        return weekly(1, Some(WeekdaySet::single(week_edge(&caps[1], week_start))));
    }
    if let Some(caps) = WEEK_EDGE.captures(text) {
        return weekly(1, Some(WeekdaySet::single(week_edge(&caps[1], week_start))));
    }

    let (interval, days) = if let Some(caps) = WEEKLY.captures(text) {
        (1, caps.get(1))
    } else if let Some(caps) = BIWEEKLY.captures(text) {
        (2, caps.get(1))
    } else if let Some(caps) = EVERY_N_WEEKS.captures(text) {
        (lexicon::count(&caps[1])?, caps.get(2))
    } else {
        let caps = DAYS_EVERY_WEEK.captures(text)?;
        let interval = match (caps.get(3), caps.get(2).or(caps.get(4))) {
            (Some(count), _) => lexicon::count(count.as_str())?,
            (None, Some(tail)) if matches!(tail.as_str(), "week" | "weekly") => 1,
            _ => 2,
        };
        (interval, caps.get(1))
    };
    let days = match days {
        Some(list) => Some(weekday_list(list.as_str())?),
        None => None,
    };
    weekly(interval, days)
}

fn week_edge(word: &str, week_start: Weekday) -> Weekday {
    match word {
        "first" | "start" => week_start,
        _ => week_start.pred(),
    }
}

/// Parses a comma/"and" separated list of month days, including "last".
fn month_day_list(text: &str, allow_bare: bool) -> Option<Vec<DayOrLast>> {
    let mut items = Vec::new();
    for item in DAY_LIST_SPLIT.split(text) {
        let item = item.trim();
        let item = item.strip_prefix("the ").unwrap_or(item);
        match item {
            "" => continue,
            "last" | "last day" => items.push(DayOrLast::Last),
            item => items.push(DayOrLast::Day(lexicon::day_of_month(item, allow_bare)?)),
        }
    }
    (!items.is_empty()).then_some(items)
}

/// Family 7: monthly forms (interval 1).
fn match_monthly(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if MONTHLY.is_match(text) {
        return Some(RecurrenceRule::MonthlyDay { interval: 1, day: None });
    }
    if MONTH_END.is_match(text) {
        return Some(RecurrenceRule::MonthlyLastDay);
    }
    if let Some(rule) = match_month_days(text) {
        return Some(rule);
    }
    if let Some(caps) = EDGE_WEEKDAY.captures(text) {
        let which = match &caps[1] {
            "first" => FirstOrLast::First,
            _ => FirstOrLast::Last,
        };
        return Some(RecurrenceRule::MonthlyNthWeekday { which });
    }
    if let Some(caps) = FROM_END.captures(text) {
        let n = match caps[1].split(['-', ' ']).next()? {
            "penultimate" | "second" | "next" | "2nd" => 2,
            "third" | "3rd" => 3,
            "fourth" | "4th" => 4,
            "5th" => 5,
            _ => return None,
        };
        let weekday = lexicon::weekday(&caps[2])?;
        return Some(RecurrenceRule::MonthlyNthFromEnd { n, weekday });
    }
    if let Some(caps) = MULTI_NTH.captures(text) {
        let weekday = lexicon::weekday(&caps[2])?;
        let ordinals: BTreeSet<Ordinal> = ORDINAL_WORD
            .find_iter(&caps[1])
            .filter_map(|m| lexicon::ordinal(m.as_str()))
            .collect();
        let ordinals: Vec<Ordinal> = ordinals.into_iter().collect();
        if ordinals.len() == 1 {
            return Some(RecurrenceRule::MonthlyNth { interval: 1, nth: ordinals[0], weekday });
        }
        return Some(RecurrenceRule::MonthlyMultiNth { ordinals, weekday });
    }
    let caps = ONE_NTH.captures(text)?;
    Some(RecurrenceRule::MonthlyNth {
        interval: 1,
        nth: lexicon::ordinal(&caps[1])?,
        weekday: lexicon::weekday(&caps[2])?,
    })
}

/// Single days and day lists: "the 15th", "1st and 15th", "1st, 15th and last".
fn match_month_days(text: &str) -> Option<RecurrenceRule> {
    let body = MONTH_DAYS.captures(text)?.get(1)?.as_str();
    let allow_bare = MONTHLY_CONTEXT.is_match(text);
    let items = month_day_list(body, allow_bare)?;
    match items.len() {
        1 => match items[0] {
            DayOrLast::Last => Some(RecurrenceRule::MonthlyLastDay),
            DayOrLast::Day(day) => Some(RecurrenceRule::MonthlyDay { interval: 1, day: Some(day) }),
        },
        2 => Some(RecurrenceRule::MonthlyMultiDay { days: items.into_iter().collect() }),
        _ => {
            let include_last = items.contains(&DayOrLast::Last);
            let days: BTreeSet<u8> = items
                .iter()
                .filter_map(|item| match item {
                    DayOrLast::Day(day) => Some(*day),
                    DayOrLast::Last => None,
                })
                .collect();
            Some(RecurrenceRule::MonthlyMixedDay { days: days.into_iter().collect(), include_last })
        }
    }
}

/// Family 8: monthly forms repeating every N months.
fn match_multi_month(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    let (interval, tail) = if let Some(caps) = EVERY_N_MONTHS.captures(text) {
        let word = &caps[1];
        let interval = lexicon::step_word(word).or_else(|| lexicon::count(word))?;
        (interval, caps.get(2))
    } else {
        let caps = BIMONTHLY.captures(text)?;
        (2, caps.get(1))
    };
    if interval == 0 {
        return None;
    }
    let Some(tail) = tail.map(|m| m.as_str()) else {
        return Some(RecurrenceRule::MonthlyDay { interval, day: None });
    };
    if LAST_DAY_TAIL.is_match(tail) {
        return Some(RecurrenceRule::MonthlyDay { interval, day: Some(31) });
    }
    if let Some(caps) = NTH_WEEKDAY_TAIL.captures(tail) {
        return Some(RecurrenceRule::MonthlyNth {
            interval,
            nth: lexicon::ordinal(&caps[1])?,
            weekday: lexicon::weekday(&caps[2])?,
        });
    }
    let day = lexicon::day_of_month(tail, true)?;
    Some(RecurrenceRule::MonthlyDay { interval, day: Some(day) })
}

/// Family 9: yearly forms.
fn match_yearly(text: &str, _week_start: Weekday) -> Option<RecurrenceRule> {
    if YEARLY.is_match(text) {
        return Some(RecurrenceRule::Yearly { month: None, day: None });
    }
    let caps = YEARLY_FORM.captures(text)?;
    let body = caps.get(1)?.as_str();

    if let Some(date) = MONTH_THEN_DAY.captures(body) {
        return yearly_on(&date[1], &date[2]);
    }
    if let Some(date) = DAY_THEN_MONTH.captures(body) {
        return yearly_on(&date[2], &date[1]);
    }
    if let Some(nth) = NTH_OF_MONTH.captures(body) {
        return Some(RecurrenceRule::YearlyNth {
            month: lexicon::month(&nth[3])?,
            nth: lexicon::ordinal(&nth[1])?,
            weekday: lexicon::weekday(&nth[2])?,
        });
    }
    // A bare month needs an explicit yearly word somewhere.
    let explicit = caps.get(2).is_some() || YEARLY_PREFIX.is_match(text) || text.starts_with("every ");
    let month = IN_MONTH.captures(body)?;
    explicit.then_some(RecurrenceRule::Yearly { month: Some(lexicon::month(&month[1])?), day: None })
}

fn yearly_on(month: &str, day: &str) -> Option<RecurrenceRule> {
    Some(RecurrenceRule::Yearly {
        month: Some(lexicon::month(month)?),
        day: Some(lexicon::day_of_month(day, true)?),
    })
}
