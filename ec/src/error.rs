//! Recurrence error types

use thiserror::Error;

/// Errors produced while compiling or expanding a recurrence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("unrecognized frequency: {0}")]
    UnknownFrequency(String),

    #[error("interval must be at least 1, got {0}")]
    IntervalTooSmall(u32),

    #[error("recurrence declares an end but no end condition was given")]
    MissingEnd,

    #[error("unrecognized end type: {0} (expected \"after\" or \"on\")")]
    UnknownEndType(String),

    #[error("invalid end value: {0}")]
    InvalidEndValue(String),

    #[error("occurrence count must be at least 1")]
    CountTooSmall,

    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("date arithmetic out of range")]
    DateOverflow,
}

impl RecurrenceError {
    /// Check if this error came from user-entered spec fields (as
    /// opposed to rule parsing or date arithmetic)
    pub fn is_spec_error(&self) -> bool {
        !matches!(self, RecurrenceError::InvalidRule(_) | RecurrenceError::DateOverflow)
    }
}
