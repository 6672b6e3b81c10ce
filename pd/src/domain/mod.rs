//! Domain types for planning sessions
//!
//! Value types owned by a session: messages, tasks, and the event
//! being planned. IDs use the format `{6-char-hex}-{type}-{slug}`.

mod event;
mod id;
mod message;
mod task;

pub use event::{Event, EventStatus};
pub use id::generate_id;
pub use message::{Message, Role};
pub use task::{Task, TaskStatus};

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's date in UTC
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
