use chrono::{Datelike, NaiveDate};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use recur_core::models::RecurrenceRule;

/// Summary of a parsed rule: the input, the variant and its canonical
/// description.
pub fn display_rule(text: &str, rule: &RecurrenceRule) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Input"), Cell::new(text)]);
    table.add_row(vec![
        Cell::new("Kind"),
        Cell::new(rule.kind()).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Meaning"),
        Cell::new(rule.to_string()).add_attribute(Attribute::Bold),
    ]);

    println!("{table}");
}

/// Upcoming dates with their weekday and distance from `today`.
pub fn display_occurrences(dates: &[NaiveDate], today: NaiveDate) {
    if dates.is_empty() {
        println!("No upcoming dates.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Day", "When"]);

    for (index, date) in dates.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(index + 1));
        row.add_cell(Cell::new(date.format("%Y-%m-%d")));
        row.add_cell(Cell::new(date.weekday()));

        let when_cell = if *date == today {
            Cell::new("today").fg(Color::Yellow)
        } else {
            Cell::new((*date - today).humanize())
        };
        row.add_cell(when_cell);
        table.add_row(row);
    }

    println!("{table}");
}
