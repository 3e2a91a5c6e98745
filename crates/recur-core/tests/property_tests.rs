use chrono::{Days, NaiveDate, Weekday};
use proptest::prelude::*;
use recur_core::models::*;
use recur_core::recurrence::compute_next;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday() -> impl Strategy<Value = Weekday> {
    prop::sample::select(WEEKDAYS.to_vec())
}

fn ordinal() -> impl Strategy<Value = Ordinal> {
    prop::sample::select(vec![
        Ordinal::First,
        Ordinal::Second,
        Ordinal::Third,
        Ordinal::Fourth,
        Ordinal::Last,
    ])
}

fn weekday_set() -> impl Strategy<Value = WeekdaySet> {
    (1u8..128).prop_map(|mask| {
        WEEKDAYS
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, day)| *day)
            .collect()
    })
}

fn rule() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        (1u32..10).prop_map(|interval| RecurrenceRule::Daily { interval }),
        Just(RecurrenceRule::Weekday),
        (1u32..5).prop_map(|interval| RecurrenceRule::BusinessDaily { interval }),
        (1u32..4, proptest::option::of(weekday_set()))
            .prop_map(|(interval, by_day)| RecurrenceRule::Weekly { interval, by_day }),
        (1u32..13, proptest::option::of(1u8..=31))
            .prop_map(|(interval, day)| RecurrenceRule::MonthlyDay { interval, day }),
        (1u32..4, ordinal(), weekday())
            .prop_map(|(interval, nth, weekday)| RecurrenceRule::MonthlyNth { interval, nth, weekday }),
        Just(RecurrenceRule::MonthlyLastDay),
        (prop::collection::vec(1u8..=31, 1..4), any::<bool>())
            .prop_map(|(days, include_last)| RecurrenceRule::MonthlyMixedDay { days, include_last }),
        (prop::collection::vec(ordinal(), 1..3), weekday())
            .prop_map(|(ordinals, weekday)| RecurrenceRule::MonthlyMultiNth { ordinals, weekday }),
        (1u32..=5, weekday()).prop_map(|(n, weekday)| RecurrenceRule::MonthlyNthFromEnd { n, weekday }),
        prop::sample::select(vec![FirstOrLast::First, FirstOrLast::Last])
            .prop_map(|which| RecurrenceRule::MonthlyNthWeekday { which }),
        (1u8..=12, 1u8..=28)
            .prop_map(|(month, day)| RecurrenceRule::Yearly { month: Some(month), day: Some(day) }),
        (1u8..=12, ordinal(), weekday())
            .prop_map(|(month, nth, weekday)| RecurrenceRule::YearlyNth { month, nth, weekday }),
    ]
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (0u64..20_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Days::new(offset)
    })
}

proptest! {
    #[test]
    fn test_repeated_computation_strictly_increases(
        rule in rule(),
        anchor in date(),
        week_start in weekday(),
    ) {
        let mut context = RecurrenceContext::new(anchor)
            .with_anchor(anchor)
            .with_week_start(week_start);
        let mut previous = anchor;
        for _ in 0..6 {
            let next = compute_next(&rule, &context, 0).unwrap();
            prop_assert!(next > previous, "{rule}: {next} is not after {previous}");
            previous = next;
            context = context.with_anchor(next);
        }
    }

    #[test]
    fn test_result_is_never_in_the_past(
        rule in rule(),
        anchor in date(),
        lag in 0u64..400,
        completion in any::<bool>(),
    ) {
        let today = anchor + Days::new(lag);
        let policy = if completion { AdvanceFrom::Completion } else { AdvanceFrom::Due };
        let context = RecurrenceContext::new(today)
            .with_anchor(anchor)
            .advancing_from(policy);
        if let Ok(next) = compute_next(&rule, &context, 0) {
            prop_assert!(next >= today, "{rule}: {next} is before {today}");
        }
    }

    #[test]
    fn test_weekly_results_land_on_selected_days(
        interval in 1u32..4,
        days in weekday_set(),
        anchor in date(),
        week_start in weekday(),
    ) {
        let rule = RecurrenceRule::Weekly { interval, by_day: Some(days) };
        let context = RecurrenceContext::new(anchor)
            .with_anchor(anchor)
            .with_week_start(week_start);
        let next = compute_next(&rule, &context, 0).unwrap();
        prop_assert!(days.contains(chrono::Datelike::weekday(&next)));
    }
}
