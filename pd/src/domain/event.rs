//! Event domain type
//!
//! The Event is the planning subject of a session: the thing the
//! conversation and the task ledger exist to deliver. Events are
//! never deleted implicitly; removal is an explicit external
//! operation.

use chrono::{NaiveDate, NaiveDateTime};
use evcal::{CalendarEntry, EntryStatus, Recurrence, RecurrenceSpec, end_of_day};
use serde::{Deserialize, Serialize};

use super::{generate_id, now_ms};
use crate::error::OrchestratorError;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Details still being firmed up
    #[default]
    Planning,
    /// Locked in
    Confirmed,
    /// It happened
    Completed,
    /// Called off
    Cancelled,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The planning subject of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "019430-event-company-offsite")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Event type descriptor (e.g. "conference", "offsite", "launch")
    pub kind: String,

    /// First day of the event
    pub start: NaiveDate,

    /// Last day of the event
    pub end: NaiveDate,

    /// Where it happens
    pub location: Option<String>,

    /// Expected headcount
    pub capacity: Option<u32>,

    /// Lifecycle status
    pub status: EventStatus,

    /// Recurrence rule for repeating events
    pub recurrence: Option<Recurrence>,

    /// Computed end of the recurrence (end of its final calendar day)
    pub recurrence_until: Option<NaiveDateTime>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Event {
    /// Create a new single-day event in planning state
    pub fn new(title: impl Into<String>, kind: impl Into<String>, start: NaiveDate) -> Self {
        let title = title.into();
        let now = now_ms();
        Self {
            id: generate_id("event", &title),
            title,
            kind: kind.into(),
            start,
            end: start,
            location: None,
            capacity: None,
            status: EventStatus::Planning,
            recurrence: None,
            recurrence_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the date range
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end.max(start);
        self
    }

    /// Set the location descriptor
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the expected capacity
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Update the status
    pub fn set_status(&mut self, status: EventStatus) {
        self.status = status;
        self.updated_at = now_ms();
    }

    /// Compile and attach a recurrence, computing its concrete end
    /// anchored at the event's start date
    pub fn set_recurrence(&mut self, spec: &RecurrenceSpec) -> Result<(), OrchestratorError> {
        let recurrence = Recurrence::compile(spec)?;
        self.recurrence_until = Some(recurrence.compute_end(self.start)?);
        self.recurrence = Some(recurrence);
        self.updated_at = now_ms();
        Ok(())
    }

    /// Render as an exportable calendar entry
    pub fn to_calendar_entry(&self) -> CalendarEntry {
        let status = match self.status {
            EventStatus::Planning => EntryStatus::Tentative,
            EventStatus::Confirmed | EventStatus::Completed => EntryStatus::Confirmed,
            EventStatus::Cancelled => EntryStatus::Cancelled,
        };

        let mut entry = CalendarEntry::new(&self.id, &self.title, self.start.and_time(chrono::NaiveTime::MIN))
            .with_end(end_of_day(self.end))
            .with_status(status);
        if let Some(location) = &self.location {
            entry = entry.with_location(location);
        }
        if let Some(recurrence) = &self.recurrence {
            entry = entry.with_recurrence(recurrence.clone());
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_new() {
        let event = Event::new("Company Offsite", "offsite", date(2025, 6, 12));
        assert!(event.id.contains("-event-"));
        assert_eq!(event.status, EventStatus::Planning);
        assert_eq!(event.start, event.end);
    }

    #[test]
    fn test_with_dates_orders_range() {
        let event = Event::new("X", "conference", date(2025, 6, 12)).with_dates(date(2025, 6, 12), date(2025, 6, 10));
        assert_eq!(event.end, date(2025, 6, 12));
    }

    #[test]
    fn test_set_recurrence_computes_until() {
        let mut event = Event::new("Sync", "meeting", date(2025, 1, 7));
        event.set_recurrence(&RecurrenceSpec::after("weekly", 1, 4)).unwrap();
        assert_eq!(event.recurrence_until, Some(end_of_day(date(2025, 1, 28))));
    }

    #[test]
    fn test_set_recurrence_invalid_spec() {
        let mut event = Event::new("Sync", "meeting", date(2025, 1, 7));
        let result = event.set_recurrence(&RecurrenceSpec::after("hourly", 1, 4));
        assert!(matches!(result, Err(OrchestratorError::InvalidRecurrenceSpec(_))));
        assert!(event.recurrence.is_none());
    }

    #[test]
    fn test_to_calendar_entry() {
        let mut event = Event::new("Launch", "launch", date(2025, 3, 1)).with_location("Main Hall");
        event.set_status(EventStatus::Confirmed);
        let entry = event.to_calendar_entry();
        assert_eq!(entry.summary, "Launch");
        assert_eq!(entry.status, EntryStatus::Confirmed);
        assert_eq!(entry.location.as_deref(), Some("Main Hall"));
        assert_eq!(entry.start.date(), date(2025, 3, 1));
    }
}
