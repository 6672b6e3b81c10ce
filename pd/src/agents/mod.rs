//! Agent catalog and the per-turn agent contract
//!
//! The catalog is a closed set of capability variants: adding or
//! removing one is a compile-time-checked change, and routing can
//! never reference a nonexistent agent. Agents themselves sit behind
//! the [`Agent`] trait - the orchestrator only sees the uniform
//! "handle turn" contract.

mod builtin;
mod registry;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use builtin::{CoordinatorAgent, SpecialistAgent};
pub use registry::AgentRegistry;

use crate::domain::Event;
use crate::gate::ProposalStatus;
use crate::ledger::Progress;

/// The fixed set of specialist capability variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Coordinator,
    ResourcePlanning,
    Financial,
    StakeholderManagement,
    MarketingCommunications,
    ProjectManagement,
    Analytics,
    ComplianceSecurity,
}

impl AgentKind {
    /// Every variant, in catalog order
    pub const ALL: [AgentKind; 8] = [
        AgentKind::Coordinator,
        AgentKind::ResourcePlanning,
        AgentKind::Financial,
        AgentKind::StakeholderManagement,
        AgentKind::MarketingCommunications,
        AgentKind::ProjectManagement,
        AgentKind::Analytics,
        AgentKind::ComplianceSecurity,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Coordinator => "Planning Coordinator",
            Self::ResourcePlanning => "Resource Planning",
            Self::Financial => "Financial Planning",
            Self::StakeholderManagement => "Stakeholder Management",
            Self::MarketingCommunications => "Marketing & Communications",
            Self::ProjectManagement => "Project Management",
            Self::Analytics => "Analytics",
            Self::ComplianceSecurity => "Compliance & Security",
        }
    }

    /// What this specialist covers
    pub fn description(&self) -> &'static str {
        match self {
            Self::Coordinator => "Routes the conversation, clarifies intent, and guards the proposal workflow",
            Self::ResourcePlanning => "Venues, vendors, equipment, catering, and logistics",
            Self::Financial => "Budgets, cost estimates, sponsorships, and payment schedules",
            Self::StakeholderManagement => "Speakers, VIPs, guest lists, and partner relations",
            Self::MarketingCommunications => "Promotion, announcements, invitations, and social media",
            Self::ProjectManagement => "Timelines, milestones, dependencies, and task tracking",
            Self::Analytics => "Attendance metrics, surveys, and post-event reporting",
            Self::ComplianceSecurity => "Permits, insurance, safety plans, and data protection",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinator => write!(f, "coordinator"),
            Self::ResourcePlanning => write!(f, "resource_planning"),
            Self::Financial => write!(f, "financial"),
            Self::StakeholderManagement => write!(f, "stakeholder_management"),
            Self::MarketingCommunications => write!(f, "marketing_communications"),
            Self::ProjectManagement => write!(f, "project_management"),
            Self::Analytics => write!(f, "analytics"),
            Self::ComplianceSecurity => write!(f, "compliance_security"),
        }
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "coordinator" => Ok(Self::Coordinator),
            "resource_planning" | "resources" => Ok(Self::ResourcePlanning),
            "financial" | "finance" => Ok(Self::Financial),
            "stakeholder_management" | "stakeholders" => Ok(Self::StakeholderManagement),
            "marketing_communications" | "marketing" => Ok(Self::MarketingCommunications),
            "project_management" | "projects" => Ok(Self::ProjectManagement),
            "analytics" => Ok(Self::Analytics),
            "compliance_security" | "compliance" => Ok(Self::ComplianceSecurity),
            other => Err(format!("unknown agent: {}", other)),
        }
    }
}

/// Everything an agent may see about the turn it is handling
///
/// A snapshot, not a live reference - agents cannot mutate session
/// state directly, they can only propose actions in their reply.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// The incoming user message
    pub text: String,

    /// Agent active before this turn, if any
    pub active_agent: Option<AgentKind>,

    /// Proposal state of the session
    pub proposal_status: ProposalStatus,

    /// Whether plan generation is currently allowed
    pub plan_allowed: bool,

    /// Set when the router substituted this agent because the
    /// requested action is blocked by the proposal gate
    pub gated: bool,

    /// The event being planned, if one exists
    pub event: Option<Event>,

    /// Current ledger aggregates
    pub progress: Progress,
}

/// Mutation an agent proposes; applied by the session all-or-nothing
/// after the agent call returns
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    /// Create one ad-hoc task (not gated by the proposal workflow)
    CreateTask(TaskSeed),

    /// Generate the project plan's tasks - only honored when the
    /// proposal gate is approved
    GeneratePlan(Vec<TaskSeed>),

    /// Submit a proposal draft for the session
    SubmitProposal { content: String },
}

/// Attributes for a task an agent wants created
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSeed {
    pub title: String,
    pub description: String,
    pub agent: AgentKind,
    pub due: Option<NaiveDate>,
    pub recurrence: Option<evcal::Recurrence>,
}

impl TaskSeed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, agent: AgentKind) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            agent,
            due: None,
            recurrence: None,
        }
    }
}

/// An agent's answer for one turn
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Text shown to the user
    pub content: String,

    /// Proposed session mutations
    pub actions: Vec<AgentAction>,

    /// Signal that this agent is done and the next turn should
    /// re-route instead of continuing with it
    pub handoff: bool,
}

impl AgentReply {
    /// Plain text reply with no side effects
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            actions: Vec::new(),
            handoff: false,
        }
    }

    /// Attach a proposed action
    pub fn with_action(mut self, action: AgentAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Mark the reply as a hand-off
    pub fn with_handoff(mut self) -> Self {
        self.handoff = true;
        self
    }
}

/// Errors from an agent call
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent timed out after {0:?}")]
    Timeout(Duration),

    #[error("agent call cancelled")]
    Cancelled,

    #[error("agent failed: {0}")]
    Failed(String),
}

impl AgentError {
    /// Whether the coordinator fallback should be tried
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Failed(_) => true,
            Self::Cancelled => false,
        }
    }
}

/// The uniform "handle turn" contract every catalog entry implements
#[async_trait]
pub trait Agent: Send + Sync {
    /// Which catalog variant this implementation serves
    fn kind(&self) -> AgentKind;

    /// Produce a reply (and optional proposed mutations) for one turn
    async fn handle_turn(&self, ctx: &TurnContext) -> Result<AgentReply, AgentError>;
}
