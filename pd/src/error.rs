//! Orchestrator error taxonomy
//!
//! Every failure the engine can surface to an external caller carries
//! a stable taxonomy code. Nothing here is process-fatal: errors are
//! scoped to a single turn or a single session and the conversation
//! continues.

use serde::Serialize;
use thiserror::Error;

use crate::agents::AgentKind;
use crate::domain::TaskStatus;

/// Errors produced by the orchestration engine
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid recurrence spec: {0}")]
    InvalidRecurrenceSpec(#[from] evcal::RecurrenceError),

    #[error("illegal task transition for {task_id}: {from} -> {to}")]
    IllegalTaskTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("a proposal already exists for this session")]
    ProposalAlreadyExists,

    #[error("proposal is not in draft state (currently {0})")]
    ProposalNotDraft(crate::gate::ProposalStatus),

    #[error("agent {agent} unavailable: {reason}")]
    AgentUnavailable { agent: AgentKind, reason: String },

    #[error("delivery queue overflowed, resynchronization required")]
    ChannelOverflow,

    #[error("no such task: {0}")]
    TaskNotFound(String),

    #[error("session is closed")]
    SessionClosed,
}

impl OrchestratorError {
    /// Stable taxonomy code reported to external collaborators
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRecurrenceSpec(_) => "InvalidRecurrenceSpec",
            Self::IllegalTaskTransition { .. } => "IllegalTaskTransition",
            Self::ProposalAlreadyExists => "ProposalAlreadyExists",
            Self::ProposalNotDraft(_) => "ProposalNotDraft",
            Self::AgentUnavailable { .. } => "AgentUnavailable",
            Self::ChannelOverflow => "ChannelOverflow",
            Self::TaskNotFound(_) => "TaskNotFound",
            Self::SessionClosed => "SessionClosed",
        }
    }

    /// Whether the failure leaves the session usable for further turns
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SessionClosed)
    }
}

/// Structured error object for external callers - taxonomy code plus
/// message, never raw internal state
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    pub code: &'static str,
    pub message: String,
}

impl From<&OrchestratorError> for ErrorObject {
    fn from(err: &OrchestratorError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}
