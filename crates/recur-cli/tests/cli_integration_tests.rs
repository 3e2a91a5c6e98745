/// Black-box tests for the `recur` binary: every command, configuration
/// precedence and the error paths.
use predicates::prelude::*;
use rstest::rstest;

mod helpers;
use helpers::{assertions, CliTestHarness};

const SECOND_AND_LAST_FRIDAY: &str = "every 2nd and last Friday of each month";

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("repeat rules"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("recur"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_parse_as_json() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["parse", "every other tuesday", "--json"])
        .stdout(predicate::str::contains("\"kind\": \"weekly\""))
        .stdout(predicate::str::contains("\"interval\": 2"))
        .stdout(predicate::str::contains("Tue"));
}

#[test]
fn test_parse_table_shows_meaning() {
    let harness = CliTestHarness::new();

    // words after the subcommand are joined into one rule
    harness
        .run_success(&["parse", "the", "last", "friday", "of", "each", "month"])
        .stdout(predicate::str::contains("monthly_nth"))
        .stdout(predicate::str::contains("every month on the last Fri"));
}

#[test]
fn test_parse_rejects_gibberish() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["parse", "when pigs fly"])
        .stderr(assertions::has_error())
        .stderr(predicate::str::contains("Could not understand this recurrence"));
}

#[rstest]
#[case(SECOND_AND_LAST_FRIDAY, "2024-01-01", "2024-01-12")]
#[case("every 3 months on the 31st", "2024-01-31", "2024-04-30")]
#[case("every weekday", "2024-01-05", "2024-01-08")]
fn test_next_date(#[case] rule: &str, #[case] from: &str, #[case] expected: &str) {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["next", rule, "--from", from, "--today", from])
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_next_catches_up_to_today() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["next", SECOND_AND_LAST_FRIDAY, "--from", "2024-01-01", "--today", "2024-03-20"])
        .stdout(predicate::str::contains("2024-03-29"));
}

#[test]
fn test_next_from_completion() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&[
            "next", "every 3 days",
            "--from", "2024-01-01",
            "--today", "2024-01-10",
            "--completion",
        ])
        .stdout(predicate::str::contains("2024-01-13"));
}

#[test]
fn test_next_reports_stale_series() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["next", "weekly", "--from", "1980-01-01", "--today", "2024-01-01"])
        .stderr(predicate::str::contains("too far behind"));
}

#[test]
fn test_next_rejects_bad_dates() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["next", "daily", "--today", "the twelfth of never"])
        .stderr(predicate::str::contains("Could not understand the date"));

    harness
        .run_failure(&["next", "daily", "--week-start", "funday"])
        .stderr(predicate::str::contains("Unknown weekday"));
}

#[test]
fn test_preview_lists_occurrences() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&[
            "preview", SECOND_AND_LAST_FRIDAY,
            "-n", "3",
            "--from", "2024-01-01",
            "--today", "2024-01-01",
        ])
        .stdout(assertions::has_preview_table_headers())
        .stdout(predicate::str::contains("2024-01-12"))
        .stdout(predicate::str::contains("2024-01-26"))
        .stdout(predicate::str::contains("2024-02-09"));
}

#[test]
fn test_preview_count_from_config() {
    let harness = CliTestHarness::with_config("preview_count = 2\n");

    harness
        .run_success(&["preview", SECOND_AND_LAST_FRIDAY, "--from", "2024-01-01", "--today", "2024-01-01"])
        .stdout(predicate::str::contains("2024-01-26"))
        .stdout(predicate::str::contains("2024-02-09").not());
}

#[rstest]
#[case("this weekend", "2024-01-06")]
#[case("next week", "2024-01-08")]
#[case("early next quarter", "2024-04-05")]
#[case("in two weeks", "2024-01-17")]
fn test_resolve_phrases(#[case] phrase: &str, #[case] expected: &str) {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["resolve", phrase, "--today", "2024-01-03"])
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_resolve_week_start_precedence() {
    let harness = CliTestHarness::with_config("week_start = \"sunday\"\n");

    // config says Sunday
    harness
        .run_success(&["resolve", "next week", "--today", "2024-01-03"])
        .stdout(predicate::str::contains("2024-01-07"));

    // the flag wins over the config
    harness
        .run_success(&["resolve", "next week", "--today", "2024-01-03", "--week-start", "monday"])
        .stdout(predicate::str::contains("2024-01-08"));

    // the environment wins over the file
    harness
        .command()
        .env("RECUR_WEEK_START", "saturday")
        .args(["resolve", "next week", "--today", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-06"));
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let harness = CliTestHarness::with_config("preview_count = \"lots\"\n");

    harness
        .run_success(&["resolve", "next week", "--today", "2024-01-03"])
        .stdout(predicate::str::contains("2024-01-08"));
}

#[test]
fn test_resolve_unknown_phrase() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["resolve", "the twelfth of never", "--today", "2024-01-03"])
        .stderr(predicate::str::contains("Could not understand the date"));
}
