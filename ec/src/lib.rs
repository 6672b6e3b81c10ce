//! evcal - calendar primitives for the plannerd orchestrator
//!
//! Pure value types with no side effects:
//!
//! - [`recurrence`] - recurrence spec compilation and occurrence
//!   expansion (daily/weekly/monthly/yearly, interval, weekday sets,
//!   positional monthly rules, end-by-date or end-after-count)
//! - [`rrule`] - lossless RFC 5545 RRULE rendering/parsing
//! - [`export`] - VEVENT/VCALENDAR rendering for external calendars

pub mod error;
pub mod export;
pub mod recurrence;
pub mod rrule;

pub use error::RecurrenceError;
pub use export::{CalendarEntry, EntryStatus, render_calendar, render_vevent};
pub use recurrence::{
    Frequency, MonthlyMode, Occurrences, Recurrence, RecurrenceEnd, RecurrenceSpec, WeekPosition, compile,
    compute_end_date, end_of_day,
};
