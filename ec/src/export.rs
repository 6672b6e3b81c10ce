//! iCalendar-entry export
//!
//! Renders calendar entries as standard VEVENT blocks so events and
//! scheduled tasks can be handed to external calendar tools. Recurring
//! entries carry an RRULE line that round-trips losslessly through
//! [`crate::rrule`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::recurrence::Recurrence;
use crate::rrule;

/// Entry status in iCalendar terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Tentative,
    Confirmed,
    Cancelled,
}

impl EntryStatus {
    fn ical_value(&self) -> &'static str {
        match self {
            Self::Tentative => "TENTATIVE",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// One exportable calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub uid: String,
    pub summary: String,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub status: EntryStatus,
    pub recurrence: Option<Recurrence>,
}

impl CalendarEntry {
    pub fn new(uid: impl Into<String>, summary: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            uid: uid.into(),
            summary: summary.into(),
            location: None,
            start,
            end: None,
            status: EntryStatus::Tentative,
            recurrence: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }
}

/// Render a single entry as a VEVENT block
pub fn render_vevent(entry: &CalendarEntry) -> String {
    let mut block = String::new();
    block.push_str("BEGIN:VEVENT\r\n");
    block.push_str(&format!("UID:{}\r\n", escape_text(&entry.uid)));
    block.push_str(&format!("SUMMARY:{}\r\n", escape_text(&entry.summary)));
    if let Some(location) = &entry.location {
        block.push_str(&format!("LOCATION:{}\r\n", escape_text(location)));
    }
    block.push_str(&format!("DTSTART:{}\r\n", entry.start.format("%Y%m%dT%H%M%S")));
    if let Some(end) = &entry.end {
        block.push_str(&format!("DTEND:{}\r\n", end.format("%Y%m%dT%H%M%S")));
    }
    block.push_str(&format!("STATUS:{}\r\n", entry.status.ical_value()));
    if let Some(recurrence) = &entry.recurrence {
        block.push_str(&format!("RRULE:{}\r\n", rrule::render(recurrence, entry.start.date())));
    }
    block.push_str("END:VEVENT\r\n");
    block
}

/// Render a full VCALENDAR document from a set of entries
pub fn render_calendar(entries: &[CalendarEntry]) -> String {
    let mut doc = String::new();
    doc.push_str("BEGIN:VCALENDAR\r\n");
    doc.push_str("VERSION:2.0\r\n");
    doc.push_str("PRODID:-//plannerd//evcal//EN\r\n");
    for entry in entries {
        doc.push_str(&render_vevent(entry));
    }
    doc.push_str("END:VCALENDAR\r\n");
    doc
}

/// Escape TEXT values per RFC 5545 section 3.3.11
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Recurrence, RecurrenceSpec};
    use chrono::NaiveDate;

    fn start(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn test_render_vevent_minimal() {
        let entry = CalendarEntry::new("abc-123", "Kickoff", start(2025, 3, 1));
        let block = render_vevent(&entry);
        assert!(block.starts_with("BEGIN:VEVENT\r\n"));
        assert!(block.contains("UID:abc-123\r\n"));
        assert!(block.contains("SUMMARY:Kickoff\r\n"));
        assert!(block.contains("DTSTART:20250301T090000\r\n"));
        assert!(block.contains("STATUS:TENTATIVE\r\n"));
        assert!(block.ends_with("END:VEVENT\r\n"));
        assert!(!block.contains("DTEND"));
        assert!(!block.contains("RRULE"));
    }

    #[test]
    fn test_render_vevent_full() {
        let spec = RecurrenceSpec::after("weekly", 1, 4);
        let rec = Recurrence::compile(&spec).unwrap();
        let entry = CalendarEntry::new("e1", "Standup; weekly", start(2025, 1, 7))
            .with_location("Room 4, HQ")
            .with_end(start(2025, 1, 7) + chrono::Duration::hours(1))
            .with_status(EntryStatus::Confirmed)
            .with_recurrence(rec.clone());

        let block = render_vevent(&entry);
        assert!(block.contains("SUMMARY:Standup\\; weekly\r\n"));
        assert!(block.contains("LOCATION:Room 4\\, HQ\r\n"));
        assert!(block.contains("DTEND:20250107T100000\r\n"));
        assert!(block.contains("STATUS:CONFIRMED\r\n"));

        // The RRULE line round-trips to the resolved descriptor
        let rrule_line = block
            .lines()
            .find(|l| l.starts_with("RRULE:"))
            .unwrap()
            .trim_start_matches("RRULE:");
        let parsed = crate::rrule::parse(rrule_line).unwrap();
        assert_eq!(parsed, rec.resolve(entry.start.date()));
    }

    #[test]
    fn test_render_calendar_wrapper() {
        let entries = vec![
            CalendarEntry::new("a", "One", start(2025, 1, 1)),
            CalendarEntry::new("b", "Two", start(2025, 1, 2)),
        ];
        let doc = render_calendar(&entries);
        assert!(doc.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(doc.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(doc.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
    }
}
