//! Vocabulary shared by the rule parser and the relative date resolver:
//! regex fragments and the word tables behind them.

use chrono::Weekday;

use crate::models::Ordinal;

/// Any weekday spelling understood by [`weekday`], singular or plural.
pub const WEEKDAY: &str = r"(?:mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday|s)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)s?";

/// Any month spelling understood by [`month`].
pub const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// Ordinals that pick a weekday inside a month.
pub const ORDINAL: &str = r"(?:1st|2nd|3rd|4th|first|second|third|fourth|last)";

/// Cardinal counts, as digits or words.
pub const COUNT: &str = r"(?:\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

/// A day of the month with an optional ordinal suffix.
pub const DAY_NUMBER: &str = r"\d{1,2}(?:st|nd|rd|th)?";

pub fn weekday(word: &str) -> Option<Weekday> {
    let word = word.trim().trim_end_matches('.');
    exact_weekday(word).or_else(|| word.strip_suffix('s').and_then(exact_weekday))
}

fn exact_weekday(word: &str) -> Option<Weekday> {
    match word {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "weds" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Decodes compact day-letter sets such as `mwf`, `tth` or `mtwrf`.
///
/// Two-letter codes win over single letters (`th` is Thursday, `tu`
/// Tuesday, `sa`/`su` the weekend days); `r` and `u` are the usual
/// single-letter stand-ins for Thursday and Sunday. Days must come in week
/// order (Monday first), so ordinary words like `must` are not read as days.
pub fn day_letters(token: &str) -> Option<Vec<Weekday>> {
    let mut days: Vec<Weekday> = Vec::new();
    let mut rest = token;
    while !rest.is_empty() {
        let (day, used) = match rest.as_bytes() {
            [b't', b'h', ..] => (Weekday::Thu, 2),
            [b't', b'u', ..] => (Weekday::Tue, 2),
            [b's', b'a', ..] => (Weekday::Sat, 2),
            [b's', b'u', ..] => (Weekday::Sun, 2),
            [b'm', ..] => (Weekday::Mon, 1),
            [b't', ..] => (Weekday::Tue, 1),
            [b'w', ..] => (Weekday::Wed, 1),
            [b'r', ..] => (Weekday::Thu, 1),
            [b'f', ..] => (Weekday::Fri, 1),
            [b's', ..] => (Weekday::Sat, 1),
            [b'u', ..] => (Weekday::Sun, 1),
            _ => return None,
        };
        if let Some(last) = days.last() {
            if last.num_days_from_monday() >= day.num_days_from_monday() {
                return None;
            }
        }
        days.push(day);
        rest = &rest[used..];
    }
    Some(days)
}

pub fn month(word: &str) -> Option<u8> {
    let word = word.trim().trim_end_matches('.');
    let month = match word {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

pub fn ordinal(word: &str) -> Option<Ordinal> {
    match word.trim() {
        "1st" | "first" => Some(Ordinal::First),
        "2nd" | "second" => Some(Ordinal::Second),
        "3rd" | "third" => Some(Ordinal::Third),
        "4th" | "fourth" => Some(Ordinal::Fourth),
        "last" => Some(Ordinal::Last),
        _ => None,
    }
}

pub fn count(word: &str) -> Option<u32> {
    let word = word.trim();
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

/// "other" means every second one; ordinal words up to "fifth" give the
/// matching step.
pub fn step_word(word: &str) -> Option<u32> {
    match word.trim() {
        "other" | "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        _ => None,
    }
}

/// A day of the month: `15`, `15th`, or the words first..fifth.
///
/// Bare numbers are only accepted when `allow_bare` is set, so that "every
/// 5" is not silently read as the 5th of the month.
pub fn day_of_month(word: &str, allow_bare: bool) -> Option<u8> {
    let word = word.trim();
    let by_word = match word {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        _ => None,
    };
    if by_word.is_some() {
        return by_word;
    }
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &word[digits.len()..];
    let suffix_ok = match suffix {
        "" => allow_bare,
        "st" | "nd" | "rd" | "th" => true,
        _ => false,
    };
    if !suffix_ok {
        return None;
    }
    let day: u8 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_spellings() {
        assert_eq!(weekday("tues"), Some(Weekday::Tue));
        assert_eq!(weekday("tuesdays"), Some(Weekday::Tue));
        assert_eq!(weekday("thurs"), Some(Weekday::Thu));
        assert_eq!(weekday("sun."), Some(Weekday::Sun));
        assert_eq!(weekday("weekday"), None);
    }

    #[test]
    fn test_day_letters() {
        assert_eq!(day_letters("mwf"), Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]));
        assert_eq!(day_letters("tth"), Some(vec![Weekday::Tue, Weekday::Thu]));
        assert_eq!(
            day_letters("mtwrf"),
            Some(vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri])
        );
        assert_eq!(day_letters("sasu"), Some(vec![Weekday::Sat, Weekday::Sun]));
        assert_eq!(day_letters("daily"), None);
        assert_eq!(day_letters("mm"), None);
        assert_eq!(day_letters("must"), None);
        assert_eq!(day_letters("sum"), None);
        assert_eq!(day_letters("rust"), None);
        assert_eq!(day_letters("wtf"), None);
    }

    #[test]
    fn test_day_of_month() {
        assert_eq!(day_of_month("15th", false), Some(15));
        assert_eq!(day_of_month("1st", false), Some(1));
        assert_eq!(day_of_month("15", false), None);
        assert_eq!(day_of_month("15", true), Some(15));
        assert_eq!(day_of_month("32nd", false), None);
        assert_eq!(day_of_month("third", false), Some(3));
        assert_eq!(day_of_month("15xy", true), None);
    }

    #[test]
    fn test_counts_and_steps() {
        assert_eq!(count("3"), Some(3));
        assert_eq!(count("twelve"), Some(12));
        assert_eq!(count("dozen"), None);
        assert_eq!(step_word("other"), Some(2));
        assert_eq!(step_word("fifth"), Some(5));
    }
}
