//! RRULE rendering and parsing
//!
//! Renders a resolved [`Recurrence`] into RFC 5545 recurrence-rule
//! notation and parses it back, losslessly, so calendar exports can
//! round-trip through external calendar tools.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::RecurrenceError;
use crate::recurrence::{Frequency, MonthlyMode, Recurrence, RecurrenceEnd, WeekPosition};

/// Render a recurrence as an RRULE value (the part after `RRULE:`)
///
/// The anchor resolves anchor-derived parts: the weekly weekday set
/// when empty, the monthly day-of-month, and the monthly position.
pub fn render(rec: &Recurrence, anchor: NaiveDate) -> String {
    let rec = rec.resolve(anchor);
    let mut parts = Vec::new();

    let freq = match rec.frequency {
        Frequency::Daily => "DAILY",
        Frequency::Weekly => "WEEKLY",
        Frequency::Monthly => "MONTHLY",
        Frequency::Yearly => "YEARLY",
    };
    parts.push(format!("FREQ={}", freq));
    parts.push(format!("INTERVAL={}", rec.interval));

    match rec.frequency {
        Frequency::Weekly => {
            let days: Vec<&str> = rec.weekdays.iter().map(|w| day_code(*w)).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        Frequency::Monthly => match rec.monthly_mode.unwrap_or(MonthlyMode::DayOfMonth) {
            MonthlyMode::DayOfMonth => {
                parts.push(format!("BYMONTHDAY={}", anchor.day()));
            }
            MonthlyMode::Positional => {
                let pos = WeekPosition::from_day_of_month(anchor.day());
                let ordinal = pos.ordinal().map(|n| n as i32).unwrap_or(-1);
                parts.push(format!("BYDAY={}{}", ordinal, day_code(anchor.weekday())));
            }
        },
        _ => {}
    }

    match rec.end {
        RecurrenceEnd::AfterCount(n) => parts.push(format!("COUNT={}", n)),
        RecurrenceEnd::OnDate(date) => {
            parts.push(format!("UNTIL={}T235959Z", date.format("%Y%m%d")));
        }
    }

    parts.join(";")
}

/// Parse an RRULE value back into a canonical descriptor
pub fn parse(rule: &str) -> Result<Recurrence, RecurrenceError> {
    let mut frequency = None;
    let mut interval = 1u32;
    let mut weekdays = Vec::new();
    let mut monthly_mode = None;
    let mut end = None;

    for part in rule.trim().trim_start_matches("RRULE:").split(';') {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| RecurrenceError::InvalidRule(format!("malformed component: {}", part)))?;

        match key.to_uppercase().as_str() {
            "FREQ" => {
                frequency = Some(match value.to_uppercase().as_str() {
                    "DAILY" => Frequency::Daily,
                    "WEEKLY" => Frequency::Weekly,
                    "MONTHLY" => Frequency::Monthly,
                    "YEARLY" => Frequency::Yearly,
                    other => return Err(RecurrenceError::UnknownFrequency(other.to_string())),
                });
            }
            "INTERVAL" => {
                interval = value
                    .parse()
                    .map_err(|_| RecurrenceError::InvalidRule(format!("bad INTERVAL: {}", value)))?;
            }
            "BYDAY" => {
                for entry in value.split(',') {
                    if entry.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-') {
                        // Ordinal form (e.g. 3TU, -1FR) marks a
                        // positional monthly rule; the position itself
                        // is re-derived from the anchor at expansion
                        monthly_mode = Some(MonthlyMode::Positional);
                    } else {
                        weekdays.push(parse_day_code(entry)?);
                    }
                }
            }
            "BYMONTHDAY" => {
                monthly_mode = Some(MonthlyMode::DayOfMonth);
            }
            "COUNT" => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| RecurrenceError::InvalidRule(format!("bad COUNT: {}", value)))?;
                set_end(&mut end, RecurrenceEnd::AfterCount(n))?;
            }
            "UNTIL" => {
                let digits: String = value.chars().take(8).collect();
                let date = NaiveDate::parse_from_str(&digits, "%Y%m%d")
                    .map_err(|_| RecurrenceError::InvalidRule(format!("bad UNTIL: {}", value)))?;
                set_end(&mut end, RecurrenceEnd::OnDate(date))?;
            }
            // Unknown components are tolerated for compatibility
            _ => {}
        }
    }

    let frequency = frequency.ok_or_else(|| RecurrenceError::InvalidRule("missing FREQ".to_string()))?;
    if interval < 1 {
        return Err(RecurrenceError::IntervalTooSmall(interval));
    }
    let end = end.ok_or(RecurrenceError::MissingEnd)?;

    if frequency == Frequency::Monthly && monthly_mode.is_none() {
        monthly_mode = Some(MonthlyMode::DayOfMonth);
    }
    if frequency != Frequency::Weekly {
        weekdays.clear();
    }
    if frequency != Frequency::Monthly {
        monthly_mode = None;
    }

    Ok(Recurrence {
        frequency,
        interval,
        weekdays,
        monthly_mode,
        end,
    })
}

fn set_end(end: &mut Option<RecurrenceEnd>, value: RecurrenceEnd) -> Result<(), RecurrenceError> {
    if end.is_some() {
        return Err(RecurrenceError::InvalidRule(
            "both COUNT and UNTIL given".to_string(),
        ));
    }
    *end = Some(value);
    Ok(())
}

fn day_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_day_code(code: &str) -> Result<Weekday, RecurrenceError> {
    match code.to_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(RecurrenceError::InvalidRule(format!("bad BYDAY entry: {}", other))),
    }
}
