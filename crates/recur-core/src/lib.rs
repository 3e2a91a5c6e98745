//! # Recur Core Library
//!
//! A recurrence rule engine for task schedulers: plain-English repeat rules
//! become structured rules, and structured rules become concrete next dates.
//!
//! ## Features
//!
//! - **Natural-Language Rules**: "every other Tuesday", "MWF", "the 2nd and
//!   last Friday of each month", "semiannually", "the 4th Thursday of November"
//! - **Bounded Catch-Up**: overdue series skip past occurrences in at most
//!   [`recurrence::MAX_CATCH_UP_STEPS`] steps, with a typed error when the
//!   series is too stale
//! - **Relative Dates**: "next friday", "this weekend", "early next quarter"
//! - **Week-Start Aware**: every week computation honours a configurable
//!   first day of the week
//! - **Pure Functions**: "today" is always an argument, never a global clock
//!
//! ## Core Modules
//!
//! - [`dates`]: Calendar primitives (month rollover, day clamping, nth weekday)
//! - [`models`]: Rule variants, weekday sets and the calculation context
//! - [`parser`]: Rule text to [`RecurrenceRule`]
//! - [`relative`]: Relative date phrases to concrete dates
//! - [`recurrence`]: Next-occurrence calculation and previews
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use recur_core::{RecurrenceContext, RecurrenceManager};
//!
//! let manager = RecurrenceManager::from_text("every 2nd and last Friday of each month", Weekday::Mon)?;
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let context = RecurrenceContext::new(today).with_anchor(today);
//!
//! let upcoming = manager.preview_occurrences(&context, 3)?;
//! assert_eq!(upcoming[0], NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
//! assert_eq!(upcoming[1], NaiveDate::from_ymd_opt(2024, 1, 26).unwrap());
//! # Ok::<(), recur_core::error::CoreError>(())
//! ```

pub mod dates;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod parser;
pub mod recurrence;
pub mod relative;

pub use error::CoreError;
pub use models::{
    AdvanceFrom, DayOrLast, FirstOrLast, Ordinal, RecurrenceContext, RecurrenceRule, WeekdaySet,
};
pub use parser::parse;
pub use recurrence::{compute_next, next_date, parse_and_compute, RecurrenceManager};
pub use relative::{resolve, resolve_at};
