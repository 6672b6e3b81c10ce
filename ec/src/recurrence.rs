//! Recurrence compilation and occurrence expansion
//!
//! A [`RecurrenceSpec`] is the raw, untrusted shape a UI form submits.
//! [`Recurrence::compile`] validates it into a canonical [`Recurrence`]
//! descriptor; expansion against an anchor date produces concrete
//! occurrence dates, respecting variable month lengths and leap years.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;

/// How often a recurrence repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(RecurrenceError::UnknownFrequency(other.to_string())),
        }
    }
}

/// How a monthly recurrence picks its day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyMode {
    /// Same day-of-month as the anchor, clamped to month length
    DayOfMonth,
    /// Same positional weekday as the anchor (e.g. third Tuesday)
    Positional,
}

/// Position of a weekday within a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPosition {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekPosition {
    /// Bucket an anchor day-of-month into weeks 1-4, or Last past day 28
    pub fn from_day_of_month(day: u32) -> Self {
        match day {
            1..=7 => Self::First,
            8..=14 => Self::Second,
            15..=21 => Self::Third,
            22..=28 => Self::Fourth,
            _ => Self::Last,
        }
    }

    /// 1-based week ordinal, None for Last
    pub fn ordinal(&self) -> Option<u32> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }
}

/// End condition for a recurrence - exactly one of a calendar date or
/// an occurrence count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceEnd {
    /// Repeats through this date (inclusive)
    OnDate(NaiveDate),
    /// Repeats for this many occurrences, the anchor being the first
    AfterCount(u32),
}

/// Raw recurrence specification as entered in a UI form
///
/// `end_value` is an occurrence count when `end_type` is `"after"`
/// and an ISO date (`YYYY-MM-DD`) when `end_type` is `"on"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceSpec {
    pub frequency: String,
    pub interval: u32,
    pub weekdays: Vec<Weekday>,
    pub monthly_mode: Option<MonthlyMode>,
    pub end_type: Option<String>,
    pub end_value: Option<serde_json::Value>,
}

impl RecurrenceSpec {
    /// Convenience constructor for an "ends after N occurrences" spec
    pub fn after(frequency: &str, interval: u32, count: u32) -> Self {
        Self {
            frequency: frequency.to_string(),
            interval,
            end_type: Some("after".to_string()),
            end_value: Some(serde_json::json!(count)),
            ..Default::default()
        }
    }

    /// Convenience constructor for an "ends on date" spec
    pub fn until(frequency: &str, interval: u32, date: NaiveDate) -> Self {
        Self {
            frequency: frequency.to_string(),
            interval,
            end_type: Some("on".to_string()),
            end_value: Some(serde_json::json!(date.format("%Y-%m-%d").to_string())),
            ..Default::default()
        }
    }

    /// Set the weekly weekday set
    pub fn with_weekdays(mut self, weekdays: &[Weekday]) -> Self {
        self.weekdays = weekdays.to_vec();
        self
    }

    /// Set the monthly mode
    pub fn with_monthly_mode(mut self, mode: MonthlyMode) -> Self {
        self.monthly_mode = Some(mode);
        self
    }
}

/// Canonical, validated recurrence descriptor
///
/// A value type - equality is field-wise, expansion has no side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: u32,
    /// Weekday set for weekly recurrences; empty means "same weekday
    /// as the anchor", resolved at expansion time
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    /// Day selection for monthly recurrences
    #[serde(default)]
    pub monthly_mode: Option<MonthlyMode>,
    pub end: RecurrenceEnd,
}

impl Recurrence {
    /// Compile a raw spec into a canonical descriptor
    pub fn compile(spec: &RecurrenceSpec) -> Result<Self, RecurrenceError> {
        let frequency: Frequency = spec.frequency.parse()?;

        if spec.interval < 1 {
            return Err(RecurrenceError::IntervalTooSmall(spec.interval));
        }

        let end = Self::compile_end(spec)?;

        let mut weekdays = if frequency == Frequency::Weekly {
            spec.weekdays.clone()
        } else {
            Vec::new()
        };
        sort_weekdays(&mut weekdays);

        let monthly_mode = if frequency == Frequency::Monthly {
            Some(spec.monthly_mode.unwrap_or(MonthlyMode::DayOfMonth))
        } else {
            None
        };

        Ok(Self {
            frequency,
            interval: spec.interval,
            weekdays,
            monthly_mode,
            end,
        })
    }

    fn compile_end(spec: &RecurrenceSpec) -> Result<RecurrenceEnd, RecurrenceError> {
        let end_type = spec.end_type.as_deref().ok_or(RecurrenceError::MissingEnd)?;
        let end_value = spec.end_value.as_ref().ok_or(RecurrenceError::MissingEnd)?;

        match end_type {
            "after" => {
                let count = match end_value {
                    serde_json::Value::Number(n) => n.as_u64(),
                    serde_json::Value::String(s) => s.parse::<u64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| RecurrenceError::InvalidEndValue(end_value.to_string()))?;

                if count < 1 {
                    return Err(RecurrenceError::CountTooSmall);
                }
                Ok(RecurrenceEnd::AfterCount(count as u32))
            }
            "on" => {
                let raw = end_value
                    .as_str()
                    .ok_or_else(|| RecurrenceError::InvalidEndValue(end_value.to_string()))?;
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| RecurrenceError::InvalidEndValue(raw.to_string()))?;
                Ok(RecurrenceEnd::OnDate(date))
            }
            other => Err(RecurrenceError::UnknownEndType(other.to_string())),
        }
    }

    /// Canonical form against an anchor: the weekly weekday set is
    /// filled from the anchor when empty
    pub fn resolve(&self, anchor: NaiveDate) -> Self {
        let mut resolved = self.clone();
        if resolved.frequency == Frequency::Weekly && resolved.weekdays.is_empty() {
            resolved.weekdays = vec![anchor.weekday()];
        }
        sort_weekdays(&mut resolved.weekdays);
        resolved
    }

    /// Iterate concrete occurrence dates, ascending, bounded by the
    /// end condition. The anchor is the first candidate.
    pub fn occurrences(&self, anchor: NaiveDate) -> Occurrences {
        Occurrences::new(self.resolve(anchor), anchor)
    }

    /// Compute the concrete end of this recurrence, normalized to the
    /// end of its calendar day (23:59:59)
    ///
    /// An explicit end date is carried through unchanged; an
    /// occurrence count is resolved to the date of the final
    /// occurrence (the anchor being occurrence 1).
    pub fn compute_end(&self, anchor: NaiveDate) -> Result<NaiveDateTime, RecurrenceError> {
        let date = match self.end {
            RecurrenceEnd::OnDate(date) => date,
            RecurrenceEnd::AfterCount(n) => self
                .occurrences(anchor)
                .nth((n - 1) as usize)
                .ok_or(RecurrenceError::DateOverflow)?,
        };
        Ok(end_of_day(date))
    }

    /// First occurrence strictly after `after`, None once the
    /// recurrence has ended
    pub fn next_after(&self, anchor: NaiveDate, after: NaiveDate) -> Option<NaiveDate> {
        self.occurrences(anchor).find(|d| *d > after)
    }

    /// Count occurrences from the anchor through `until` (inclusive)
    pub fn count_occurrences(&self, anchor: NaiveDate, until: NaiveDate) -> u32 {
        self.occurrences(anchor).take_while(|d| *d <= until).count() as u32
    }
}

/// Compile a raw spec (free-function form of [`Recurrence::compile`])
pub fn compile(spec: &RecurrenceSpec) -> Result<Recurrence, RecurrenceError> {
    Recurrence::compile(spec)
}

/// Compile a raw spec and resolve its concrete end for an anchor date
pub fn compute_end_date(spec: &RecurrenceSpec, anchor: NaiveDate) -> Result<NaiveDateTime, RecurrenceError> {
    Recurrence::compile(spec)?.compute_end(anchor)
}

/// Normalize a date to the last second of its calendar day
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}

fn sort_weekdays(weekdays: &mut Vec<Weekday>) {
    weekdays.sort_by_key(|w| w.num_days_from_monday());
    weekdays.dedup();
}

/// Number of days in a calendar month
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// The `pos`-th `weekday` of the month containing `year`/`month`
fn positional_day(year: i32, month: u32, weekday: Weekday, pos: WeekPosition) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let first_match = first.checked_add_days(Days::new(offset as u64))?;

    match pos.ordinal() {
        // Weeks 1-4 always fit within the month (4th match is <= day 28)
        Some(n) => first_match.checked_add_days(Days::new(7 * (n as u64 - 1))),
        None => {
            let remaining = (days_in_month(year, month) - first_match.day()) / 7;
            first_match.checked_add_days(Days::new(7 * remaining as u64))
        }
    }
}

/// Iterator over the concrete dates of a resolved recurrence
pub struct Occurrences {
    rec: Recurrence,
    anchor: NaiveDate,
    /// Week containing the anchor, normalized to Monday (weekly only)
    week_start: NaiveDate,
    /// Positional rule resolved from the anchor (monthly positional only)
    positional: Option<(WeekPosition, Weekday)>,
    period: u64,
    slot: usize,
    emitted: u32,
    done: bool,
}

impl Occurrences {
    fn new(rec: Recurrence, anchor: NaiveDate) -> Self {
        let week_start = anchor
            .checked_sub_days(Days::new(anchor.weekday().num_days_from_monday() as u64))
            .unwrap_or(anchor);
        let positional = match rec.monthly_mode {
            Some(MonthlyMode::Positional) => {
                Some((WeekPosition::from_day_of_month(anchor.day()), anchor.weekday()))
            }
            _ => None,
        };
        Self {
            rec,
            anchor,
            week_start,
            positional,
            period: 0,
            slot: 0,
            emitted: 0,
            done: false,
        }
    }

    fn next_candidate(&mut self) -> Option<NaiveDate> {
        let interval = self.rec.interval as u64;
        match self.rec.frequency {
            Frequency::Daily => {
                let date = self.anchor.checked_add_days(Days::new(self.period * interval))?;
                self.period += 1;
                Some(date)
            }
            Frequency::Weekly => loop {
                if self.slot >= self.rec.weekdays.len() {
                    self.period += 1;
                    self.slot = 0;
                }
                let weekday = self.rec.weekdays[self.slot];
                self.slot += 1;
                let date = self
                    .week_start
                    .checked_add_days(Days::new(self.period * interval * 7 + weekday.num_days_from_monday() as u64))?;
                // Skip set-days earlier in the anchor's own week
                if date >= self.anchor {
                    return Some(date);
                }
            },
            Frequency::Monthly => {
                let months = Months::new((self.period * interval) as u32);
                self.period += 1;
                match self.positional {
                    // Day-of-month: chrono's Months addition clamps to month length
                    None => self.anchor.checked_add_months(months),
                    Some((pos, weekday)) => {
                        let base = self.anchor.with_day(1)?.checked_add_months(months)?;
                        positional_day(base.year(), base.month(), weekday, pos)
                    }
                }
            }
            Frequency::Yearly => {
                let months = Months::new((self.period * interval * 12) as u32);
                self.period += 1;
                self.anchor.checked_add_months(months)
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }

        if let RecurrenceEnd::AfterCount(n) = self.rec.end
            && self.emitted >= n
        {
            self.done = true;
            return None;
        }

        let Some(date) = self.next_candidate() else {
            self.done = true;
            return None;
        };

        if let RecurrenceEnd::OnDate(until) = self.rec.end
            && date > until
        {
            self.done = true;
            return None;
        }

        self.emitted += 1;
        Some(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compile_basic() {
        let spec = RecurrenceSpec::after("weekly", 2, 5);
        let rec = Recurrence::compile(&spec).unwrap();
        assert_eq!(rec.frequency, Frequency::Weekly);
        assert_eq!(rec.interval, 2);
        assert_eq!(rec.end, RecurrenceEnd::AfterCount(5));
    }

    #[test]
    fn test_compile_unknown_frequency() {
        let spec = RecurrenceSpec::after("fortnightly", 1, 3);
        assert_eq!(
            Recurrence::compile(&spec),
            Err(RecurrenceError::UnknownFrequency("fortnightly".to_string()))
        );
    }

    #[test]
    fn test_compile_interval_too_small() {
        let spec = RecurrenceSpec::after("daily", 0, 3);
        assert_eq!(Recurrence::compile(&spec), Err(RecurrenceError::IntervalTooSmall(0)));
    }

    #[test]
    fn test_compile_missing_end() {
        let spec = RecurrenceSpec {
            frequency: "daily".to_string(),
            interval: 1,
            ..Default::default()
        };
        assert_eq!(Recurrence::compile(&spec), Err(RecurrenceError::MissingEnd));
    }

    #[test]
    fn test_compile_unknown_end_type() {
        let mut spec = RecurrenceSpec::after("daily", 1, 3);
        spec.end_type = Some("until".to_string());
        assert_eq!(
            Recurrence::compile(&spec),
            Err(RecurrenceError::UnknownEndType("until".to_string()))
        );
    }

    #[test]
    fn test_compile_count_too_small() {
        let spec = RecurrenceSpec::after("daily", 1, 0);
        assert_eq!(Recurrence::compile(&spec), Err(RecurrenceError::CountTooSmall));
    }

    #[test]
    fn test_compile_end_date() {
        let spec = RecurrenceSpec::until("monthly", 1, date(2025, 6, 30));
        let rec = Recurrence::compile(&spec).unwrap();
        assert_eq!(rec.end, RecurrenceEnd::OnDate(date(2025, 6, 30)));
    }

    #[test]
    fn test_compile_count_as_string() {
        let mut spec = RecurrenceSpec::after("daily", 1, 1);
        spec.end_value = Some(serde_json::json!("12"));
        let rec = Recurrence::compile(&spec).unwrap();
        assert_eq!(rec.end, RecurrenceEnd::AfterCount(12));
    }

    #[test]
    fn test_weekly_four_tuesdays_ends_three_weeks_out() {
        // 2025-01-07 is a Tuesday
        let anchor = date(2025, 1, 7);
        let spec = RecurrenceSpec::after("weekly", 1, 4).with_weekdays(&[Weekday::Tue]);
        let rec = Recurrence::compile(&spec).unwrap();

        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(
            dates,
            vec![anchor, date(2025, 1, 14), date(2025, 1, 21), date(2025, 1, 28)]
        );

        let end = rec.compute_end(anchor).unwrap();
        assert_eq!(end.date(), anchor + Days::new(21));
        assert_eq!(end, end_of_day(date(2025, 1, 28)));
    }

    #[test]
    fn test_weekly_empty_set_uses_anchor_weekday() {
        let anchor = date(2025, 1, 7); // Tuesday
        let spec = RecurrenceSpec::after("weekly", 1, 3);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(dates, vec![anchor, date(2025, 1, 14), date(2025, 1, 21)]);
        assert_eq!(rec.resolve(anchor).weekdays, vec![Weekday::Tue]);
    }

    #[test]
    fn test_weekly_multi_day_set() {
        // Anchor Wednesday with {Mon, Wed}: Monday of the anchor week
        // is in the past and must be skipped
        let anchor = date(2025, 1, 8);
        let spec = RecurrenceSpec::after("weekly", 1, 4).with_weekdays(&[Weekday::Wed, Weekday::Mon]);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(
            dates,
            vec![anchor, date(2025, 1, 13), date(2025, 1, 15), date(2025, 1, 20)]
        );
    }

    #[test]
    fn test_monthly_day_clamps_to_short_months() {
        let anchor = date(2025, 1, 31);
        let spec = RecurrenceSpec::after("monthly", 1, 4);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        // Feb clamps to 28, later months recover the original day
        assert_eq!(
            dates,
            vec![anchor, date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]
        );
    }

    #[test]
    fn test_monthly_positional_third_tuesday() {
        // 2025-01-21 is the third Tuesday of January
        let anchor = date(2025, 1, 21);
        let spec = RecurrenceSpec::after("monthly", 1, 3).with_monthly_mode(MonthlyMode::Positional);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(dates, vec![anchor, date(2025, 2, 18), date(2025, 3, 18)]);
    }

    #[test]
    fn test_monthly_positional_last_friday() {
        // 2025-01-31 is the last Friday of January (day > 28 buckets to Last)
        let anchor = date(2025, 1, 31);
        let spec = RecurrenceSpec::after("monthly", 1, 3).with_monthly_mode(MonthlyMode::Positional);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(dates, vec![anchor, date(2025, 2, 28), date(2025, 3, 28)]);
    }

    #[test]
    fn test_yearly_leap_day() {
        let anchor = date(2024, 2, 29);
        let spec = RecurrenceSpec::after("yearly", 1, 3);
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        // Non-leap years clamp to Feb 28
        assert_eq!(dates, vec![anchor, date(2025, 2, 28), date(2026, 2, 28)]);
    }

    #[test]
    fn test_end_date_bound_is_inclusive() {
        let anchor = date(2025, 1, 1);
        let spec = RecurrenceSpec::until("daily", 2, date(2025, 1, 5));
        let rec = Recurrence::compile(&spec).unwrap();
        let dates: Vec<_> = rec.occurrences(anchor).collect();
        assert_eq!(dates, vec![anchor, date(2025, 1, 3), date(2025, 1, 5)]);
    }

    #[test]
    fn test_explicit_end_normalized_to_end_of_day() {
        let spec = RecurrenceSpec::until("daily", 1, date(2025, 3, 10));
        let rec = Recurrence::compile(&spec).unwrap();
        let end = rec.compute_end(date(2025, 3, 1)).unwrap();
        assert_eq!(end, end_of_day(date(2025, 3, 10)));
    }

    #[test]
    fn test_next_after() {
        let anchor = date(2025, 1, 7);
        let spec = RecurrenceSpec::after("weekly", 1, 3);
        let rec = Recurrence::compile(&spec).unwrap();
        assert_eq!(rec.next_after(anchor, anchor), Some(date(2025, 1, 14)));
        assert_eq!(rec.next_after(anchor, date(2025, 1, 14)), Some(date(2025, 1, 21)));
        // Past the final occurrence
        assert_eq!(rec.next_after(anchor, date(2025, 1, 21)), None);
    }

    #[test]
    fn test_count_occurrences_round_trip() {
        let anchor = date(2025, 1, 7);
        for n in 1..=12u32 {
            let spec = RecurrenceSpec::after("weekly", 2, n);
            let rec = Recurrence::compile(&spec).unwrap();
            let end = rec.compute_end(anchor).unwrap();
            assert_eq!(rec.count_occurrences(anchor, end.date()), n);
        }
    }

    #[test]
    fn test_descriptor_serde_round_trip() {
        let spec = RecurrenceSpec::after("weekly", 1, 4).with_weekdays(&[Weekday::Tue, Weekday::Thu]);
        let rec = Recurrence::compile(&spec).unwrap();
        let json = serde_json::to_string(&rec).unwrap();
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn test_week_position_buckets() {
        assert_eq!(WeekPosition::from_day_of_month(1), WeekPosition::First);
        assert_eq!(WeekPosition::from_day_of_month(7), WeekPosition::First);
        assert_eq!(WeekPosition::from_day_of_month(8), WeekPosition::Second);
        assert_eq!(WeekPosition::from_day_of_month(21), WeekPosition::Third);
        assert_eq!(WeekPosition::from_day_of_month(28), WeekPosition::Fourth);
        assert_eq!(WeekPosition::from_day_of_month(29), WeekPosition::Last);
        assert_eq!(WeekPosition::from_day_of_month(31), WeekPosition::Last);
    }

    proptest! {
        /// compile + compute_end yields an end strictly after the
        /// anchor, and counting occurrences back recovers N
        #[test]
        fn prop_after_count_round_trip(
            freq in prop::sample::select(vec!["daily", "weekly", "monthly", "yearly"]),
            interval in 1u32..4,
            n in 1u32..24,
            day_offset in 0i64..3650,
        ) {
            let anchor = date(2020, 1, 1) + Days::new(day_offset as u64);
            let spec = RecurrenceSpec::after(freq, interval, n);
            let rec = Recurrence::compile(&spec).unwrap();

            let end = rec.compute_end(anchor).unwrap();
            prop_assert!(end > anchor.and_time(NaiveTime::MIN));
            prop_assert_eq!(rec.count_occurrences(anchor, end.date()), n);
        }

        /// Occurrence dates are strictly increasing
        #[test]
        fn prop_occurrences_ascending(
            interval in 1u32..4,
            n in 2u32..16,
            day_offset in 0i64..3650,
        ) {
            let anchor = date(2020, 1, 1) + Days::new(day_offset as u64);
            let spec = RecurrenceSpec::after("monthly", interval, n);
            let rec = Recurrence::compile(&spec).unwrap();

            let dates: Vec<_> = rec.occurrences(anchor).collect();
            prop_assert_eq!(dates.len(), n as usize);
            for pair in dates.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
