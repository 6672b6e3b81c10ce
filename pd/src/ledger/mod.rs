//! Task ledger
//!
//! Per-session task store in creation order. The ledger owns the
//! transition rules: illegal edges are rejected without mutation, and
//! completing a recurring task spawns the next occurrence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agents::AgentKind;
use crate::domain::{Task, TaskStatus};
use crate::error::OrchestratorError;

/// AND-composed task query; `None` fields match everything
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub agent: Option<AgentKind>,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(agent) = self.agent
            && task.agent != agent
        {
            return false;
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !task.title.to_lowercase().contains(&needle) && !task.description.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Result of a ledger mutation that may materialize an occurrence
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The task after the mutation
    pub updated: Task,
    /// Next occurrence spawned off a recurring task
    pub spawned: Option<Task>,
}

/// Ledger aggregates; cancelled tasks are excluded from the total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl Progress {
    /// Completed share of non-cancelled tasks, rounded to whole
    /// percent; 0 when the ledger is empty
    pub fn percent_complete(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// All tasks of one session, in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskLedger {
    tasks: Vec<Task>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task; creation order is the iteration order
    pub fn create(&mut self, task: Task) -> &Task {
        debug!(task_id = %task.id, agent = %task.agent, "task created");
        self.tasks.push(task);
        self.tasks.last().unwrap()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks matching the filter, in creation order
    pub fn list(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Move a task to `next`. Rejects unknown ids and illegal edges
    /// without touching the ledger. Completing a recurring task
    /// spawns a pending task for the next occurrence and moves the
    /// recurrence rule onto it, so the completed task can never spawn
    /// twice.
    pub fn transition(&mut self, id: &str, next: TaskStatus) -> Result<TransitionOutcome, OrchestratorError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| OrchestratorError::TaskNotFound(id.to_string()))?;

        let current = self.tasks[index].status;
        if !current.can_transition_to(next) {
            return Err(OrchestratorError::IllegalTaskTransition {
                task_id: id.to_string(),
                from: current,
                to: next,
            });
        }

        let mut spawned = None;
        if next == TaskStatus::Completed
            && let Some(recurrence) = self.tasks[index].recurrence.take()
            && let Some(completed_due) = self.tasks[index].due
        {
            let anchor = self.tasks[index].recurrence_anchor.unwrap_or(completed_due);
            if let Some(next_due) = recurrence.next_after(anchor, completed_due) {
                let source = &self.tasks[index];
                let mut follow_up =
                    Task::new(source.title.clone(), source.description.clone(), source.agent).with_due(next_due);
                follow_up.recurrence = Some(recurrence);
                follow_up.recurrence_anchor = Some(anchor);
                debug!(task_id = %source.id, next_id = %follow_up.id, due = %next_due, "spawned next occurrence");
                spawned = Some(follow_up);
            }
        }

        self.tasks[index].set_status(next);
        debug!(task_id = %id, from = %current, to = %next, "task transitioned");
        let updated = self.tasks[index].clone();

        if let Some(task) = spawned.clone() {
            self.tasks.push(task);
        }

        Ok(TransitionOutcome { updated, spawned })
    }

    /// Materialize overdue recurring tasks. A pending recurring task
    /// whose due date is before `today` keeps its overdue entry as
    /// the record of the missed occurrence; the recurrence moves onto
    /// a spawned pending task due at the first occurrence on or after
    /// today, mirroring the completion path. A series already past
    /// its end just loses its rule.
    pub fn roll_forward(&mut self, today: NaiveDate) -> Vec<TransitionOutcome> {
        let mut outcomes = Vec::new();
        let mut spawns = Vec::new();
        for task in &mut self.tasks {
            if task.status == TaskStatus::Pending
                && let Some(due) = task.due
                && due < today
                && let Some(recurrence) = task.recurrence.take()
            {
                let anchor = task.recurrence_anchor.unwrap_or(due);
                let mut next = recurrence.next_after(anchor, due);
                while let Some(d) = next
                    && d < today
                {
                    next = recurrence.next_after(anchor, d);
                }

                task.updated_at = crate::domain::now_ms();
                let spawned = next.map(|new_due| {
                    let mut follow_up =
                        Task::new(task.title.clone(), task.description.clone(), task.agent).with_due(new_due);
                    follow_up.recurrence = Some(recurrence);
                    follow_up.recurrence_anchor = Some(anchor);
                    debug!(task_id = %task.id, next_id = %follow_up.id, due = %new_due, "rolled forward to next occurrence");
                    follow_up
                });
                if let Some(follow_up) = &spawned {
                    spawns.push(follow_up.clone());
                }
                outcomes.push(TransitionOutcome {
                    updated: task.clone(),
                    spawned,
                });
            }
        }
        self.tasks.extend(spawns);
        outcomes
    }

    /// Aggregate counts; cancelled tasks don't count toward the total
    pub fn progress(&self) -> Progress {
        let mut progress = Progress::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => progress.pending += 1,
                TaskStatus::InProgress => progress.in_progress += 1,
                TaskStatus::Completed => progress.completed += 1,
                TaskStatus::Cancelled => progress.cancelled += 1,
            }
        }
        progress.total = progress.pending + progress.in_progress + progress.completed;
        progress
    }
}
