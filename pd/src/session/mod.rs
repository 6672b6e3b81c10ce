//! Session state and its mutation surface
//!
//! A session is one planning conversation: its message log, the event
//! under discussion, the task ledger, and the proposal gate. Every
//! mutation goes through a method here and yields a [`Delta`]
//! describing exactly what changed, so delivery channels can stream
//! increments instead of snapshots.

mod engine;
mod runtime;

use chrono::NaiveDate;
use evcal::{Recurrence, RecurrenceSpec};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use engine::{CancelHandle, CancelToken, TurnEngine};
pub use runtime::{SessionHandle, SessionManager, SessionRequest};

use crate::agents::AgentKind;
use crate::domain::{Event, Message, Task, TaskStatus, generate_id, now_ms};
use crate::error::OrchestratorError;
use crate::gate::{ProposalGate, ProposalStatus};
use crate::ledger::{Progress, TaskFilter, TaskLedger};

/// How a task appears in a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskChangeKind {
    Created,
    Updated,
}

/// One task-level change within a delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskChange {
    pub kind: TaskChangeKind,
    pub task: Task,
}

/// Incremental description of one session mutation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub session_id: String,
    /// Messages appended this mutation, in order
    pub messages: Vec<Message>,
    /// Tasks created or updated this mutation, in order
    pub task_changes: Vec<TaskChange>,
    /// New proposal status, when it changed
    pub proposal_status: Option<ProposalStatus>,
    /// New active agent, when it changed
    pub active_agent: Option<AgentKind>,
}

impl Delta {
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.task_changes.is_empty()
            && self.proposal_status.is_none()
            && self.active_agent.is_none()
    }
}

/// Full point-in-time view of a session, for resynchronizing clients
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub messages: Vec<Message>,
    pub event: Option<Event>,
    pub active_agent: Option<AgentKind>,
    pub proposal_status: ProposalStatus,
    pub proposal_content: Option<String>,
    pub tasks: Vec<Task>,
    pub progress: Progress,
}

/// One planning conversation and everything it owns
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub event: Option<Event>,
    pub active_agent: Option<AgentKind>,
    pub gate: ProposalGate,
    pub ledger: TaskLedger,
    /// Set when the last agent reply handed off; the next turn
    /// re-routes instead of continuing
    pub pending_handoff: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    pub fn new(name: &str) -> Self {
        let now = now_ms();
        let session = Self {
            id: generate_id("session", name),
            messages: Vec::new(),
            event: None,
            active_agent: None,
            gate: ProposalGate::new(),
            ledger: TaskLedger::new(),
            pending_handoff: false,
            created_at: now,
            updated_at: now,
        };
        info!(session_id = %session.id, "session created");
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            messages: self.messages.clone(),
            event: self.event.clone(),
            active_agent: self.active_agent,
            proposal_status: self.gate.status(),
            proposal_content: self.gate.content().map(str::to_string),
            tasks: self.ledger.iter().cloned().collect(),
            progress: self.ledger.progress(),
        }
    }

    /// Attach or replace the event under discussion
    pub fn set_event(&mut self, event: Event) -> Delta {
        self.event = Some(event);
        self.touch();
        Delta::empty(&self.id)
    }

    /// Submit the proposal directly (outside a turn)
    pub fn submit_proposal(&mut self, content: impl Into<String>) -> Result<Delta, OrchestratorError> {
        self.gate.submit_draft(content)?;
        self.touch();
        Ok(Delta {
            proposal_status: Some(self.gate.status()),
            ..Delta::empty(&self.id)
        })
    }

    /// Approve the drafted proposal
    pub fn approve_proposal(&mut self) -> Result<Delta, OrchestratorError> {
        self.gate.approve()?;
        self.touch();
        info!(session_id = %self.id, "proposal approved, plan generation unlocked");
        Ok(Delta {
            proposal_status: Some(self.gate.status()),
            ..Delta::empty(&self.id)
        })
    }

    /// Create a task directly (outside a turn). Recurring tasks are
    /// anchored at their due date, or today when no due date is given.
    pub fn create_task(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        agent: AgentKind,
        due: Option<NaiveDate>,
        recurrence: Option<&RecurrenceSpec>,
    ) -> Result<Delta, OrchestratorError> {
        let mut task = Task::new(title, description, agent);
        if let Some(spec) = recurrence {
            let compiled = Recurrence::compile(spec)?;
            let anchor = due.unwrap_or_else(crate::domain::today);
            task = task.with_recurrence(compiled, anchor);
        } else if let Some(due) = due {
            task = task.with_due(due);
        }

        let created = self.ledger.create(task).clone();
        self.touch();
        Ok(Delta {
            task_changes: vec![TaskChange {
                kind: TaskChangeKind::Created,
                task: created,
            }],
            ..Delta::empty(&self.id)
        })
    }

    /// Move a task through the workflow; completing a recurring task
    /// also reports the spawned next occurrence
    pub fn transition_task(&mut self, id: &str, next: TaskStatus) -> Result<Delta, OrchestratorError> {
        let outcome = self.ledger.transition(id, next)?;
        self.touch();

        let mut task_changes = vec![TaskChange {
            kind: TaskChangeKind::Updated,
            task: outcome.updated,
        }];
        if let Some(spawned) = outcome.spawned {
            task_changes.push(TaskChange {
                kind: TaskChangeKind::Created,
                task: spawned,
            });
        }
        Ok(Delta {
            task_changes,
            ..Delta::empty(&self.id)
        })
    }

    /// Materialize the next occurrence of overdue recurring tasks;
    /// the missed occurrences stay on record
    pub fn roll_forward(&mut self, today: NaiveDate) -> Delta {
        let outcomes = self.ledger.roll_forward(today);
        if !outcomes.is_empty() {
            self.touch();
        }
        let mut task_changes = Vec::new();
        for outcome in outcomes {
            task_changes.push(TaskChange {
                kind: TaskChangeKind::Updated,
                task: outcome.updated,
            });
            if let Some(spawned) = outcome.spawned {
                task_changes.push(TaskChange {
                    kind: TaskChangeKind::Created,
                    task: spawned,
                });
            }
        }
        Delta {
            task_changes,
            ..Delta::empty(&self.id)
        }
    }

    pub fn tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.ledger.list(filter).into_iter().cloned().collect()
    }

    pub fn progress(&self) -> Progress {
        self.ledger.progress()
    }

    /// Render the event and every dated task as an iCalendar document
    pub fn export_calendar(&self) -> String {
        let mut entries = Vec::new();
        if let Some(event) = &self.event {
            entries.push(event.to_calendar_entry());
        }
        for task in self.ledger.iter() {
            if let Some(due) = task.due {
                let status = match task.status {
                    TaskStatus::Completed => evcal::EntryStatus::Confirmed,
                    TaskStatus::Cancelled => evcal::EntryStatus::Cancelled,
                    _ => evcal::EntryStatus::Tentative,
                };
                let mut entry = evcal::CalendarEntry::new(&task.id, &task.title, due.and_time(chrono::NaiveTime::MIN))
                    .with_end(evcal::end_of_day(due))
                    .with_status(status);
                if let Some(recurrence) = &task.recurrence {
                    entry = entry.with_recurrence(recurrence.clone());
                }
                entries.push(entry);
            }
        }
        evcal::render_calendar(&entries)
    }

    fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_proposal_flow_produces_deltas() {
        let mut session = Session::new("offsite");
        let delta = session.submit_proposal("summer offsite").unwrap();
        assert_eq!(delta.proposal_status, Some(ProposalStatus::Draft));

        let delta = session.approve_proposal().unwrap();
        assert_eq!(delta.proposal_status, Some(ProposalStatus::Approved));

        assert!(session.approve_proposal().is_err());
        assert_eq!(session.gate.status(), ProposalStatus::Approved);
    }

    #[test]
    fn test_create_recurring_task_anchors_at_due() {
        let mut session = Session::new("offsite");
        let delta = session
            .create_task(
                "Weekly sync",
                "",
                AgentKind::ProjectManagement,
                Some(date(2025, 1, 7)),
                Some(&RecurrenceSpec::after("weekly", 1, 4)),
            )
            .unwrap();
        assert_eq!(delta.task_changes.len(), 1);
        assert_eq!(delta.task_changes[0].task.due, Some(date(2025, 1, 7)));
    }

    #[test]
    fn test_create_task_invalid_recurrence_leaves_ledger_untouched() {
        let mut session = Session::new("offsite");
        let result = session.create_task(
            "x",
            "",
            AgentKind::Analytics,
            None,
            Some(&RecurrenceSpec::after("hourly", 1, 4)),
        );
        assert!(matches!(result, Err(OrchestratorError::InvalidRecurrenceSpec(_))));
        assert!(session.ledger.is_empty());
    }

    #[test]
    fn test_transition_delta_includes_spawned_occurrence() {
        let mut session = Session::new("offsite");
        let delta = session
            .create_task(
                "Report",
                "",
                AgentKind::Analytics,
                Some(date(2025, 1, 7)),
                Some(&RecurrenceSpec::after("weekly", 1, 3)),
            )
            .unwrap();
        let id = delta.task_changes[0].task.id.clone();

        session.transition_task(&id, TaskStatus::InProgress).unwrap();
        let delta = session.transition_task(&id, TaskStatus::Completed).unwrap();
        assert_eq!(delta.task_changes.len(), 2);
        assert_eq!(delta.task_changes[0].kind, TaskChangeKind::Updated);
        assert_eq!(delta.task_changes[1].kind, TaskChangeKind::Created);
        assert_eq!(delta.task_changes[1].task.due, Some(date(2025, 1, 14)));
    }

    #[test]
    fn test_roll_forward_delta_reports_spawn() {
        let mut session = Session::new("offsite");
        session
            .create_task(
                "Report",
                "",
                AgentKind::Analytics,
                Some(date(2025, 1, 7)),
                Some(&RecurrenceSpec::after("weekly", 1, 10)),
            )
            .unwrap();

        let delta = session.roll_forward(date(2025, 1, 20));
        assert_eq!(delta.task_changes.len(), 2);
        assert_eq!(delta.task_changes[0].kind, TaskChangeKind::Updated);
        assert_eq!(delta.task_changes[1].kind, TaskChangeKind::Created);
        assert_eq!(delta.task_changes[1].task.due, Some(date(2025, 1, 21)));

        // caught up, so the next call is a no-op delta
        assert!(session.roll_forward(date(2025, 1, 20)).is_empty());
    }

    #[test]
    fn test_export_calendar_includes_event_and_dated_tasks() {
        let mut session = Session::new("launch");
        session.set_event(Event::new("Launch", "launch", date(2025, 3, 1)));
        session
            .create_task("Book venue", "", AgentKind::ResourcePlanning, Some(date(2025, 2, 1)), None)
            .unwrap();
        session.create_task("Undated", "", AgentKind::Analytics, None, None).unwrap();

        let ics = session.export_calendar();
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("SUMMARY:Launch"));
        assert!(ics.contains("SUMMARY:Book venue"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = Session::new("offsite");
        session.submit_proposal("p").unwrap();
        session.create_task("t", "", AgentKind::Financial, None, None).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.proposal_status, ProposalStatus::Draft);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.progress.total, 1);
    }
}
