//! Task domain type
//!
//! A Task is one unit of planning work, owned by a session's ledger
//! and assigned to one of the specialist agents.

use chrono::NaiveDate;
use evcal::Recurrence;
use serde::{Deserialize, Serialize};

use super::{generate_id, now_ms};
use crate::agents::AgentKind;

/// Task status in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet started
    #[default]
    Pending,
    /// Someone is working on it
    InProgress,
    /// Done
    Completed,
    /// Abandoned
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

impl TaskStatus {
    /// The legal transition table - these are the only edges
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::Pending, Self::Cancelled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Cancelled)
        )
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// One unit of planning work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (e.g., "019430-task-book-venue")
    pub id: String,

    /// Short human-readable title
    pub title: String,

    /// What needs doing
    pub description: String,

    /// Specialist responsible for the task
    pub agent: AgentKind,

    /// Current status in the workflow
    pub status: TaskStatus,

    /// Optional due date
    pub due: Option<NaiveDate>,

    /// Recurrence rule; present only on the currently-open occurrence
    pub recurrence: Option<Recurrence>,

    /// Anchor date of the recurrence series; fixed across spawned
    /// occurrences so count-based series terminate
    pub recurrence_anchor: Option<NaiveDate>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Task {
    /// Create a new pending task
    pub fn new(title: impl Into<String>, description: impl Into<String>, agent: AgentKind) -> Self {
        let title = title.into();
        let now = now_ms();
        Self {
            id: generate_id("task", &title),
            title,
            description: description.into(),
            agent,
            status: TaskStatus::Pending,
            due: None,
            recurrence: None,
            recurrence_anchor: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a due date
    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due = Some(due);
        self
    }

    /// Make the task recurring; the due date becomes the first
    /// occurrence on or after the anchor
    pub fn with_recurrence(mut self, recurrence: Recurrence, anchor: NaiveDate) -> Self {
        self.due = recurrence.occurrences(anchor).next();
        self.recurrence = Some(recurrence);
        self.recurrence_anchor = Some(anchor);
        self
    }

    /// Update the status (legality is enforced by the ledger)
    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = now_ms();
    }
}
