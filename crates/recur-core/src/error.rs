use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("No occurrence found for rule: {0}")]
    NoOccurrence(String),

    #[error("Series is too far behind to catch up after {steps} steps (last candidate {last})")]
    CatchUpExhausted { steps: u8, last: NaiveDate },
}
