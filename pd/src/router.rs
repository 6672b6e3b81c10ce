//! Turn routing
//!
//! Picks which agent handles an incoming turn. Precedence: explicit
//! selection, then continuation with the active agent, then content
//! hints, then the coordinator. Independently of who was picked, a
//! plan-generation request is gated back to the coordinator while the
//! proposal gate is shut.

use crate::agents::AgentKind;
use crate::gate::ProposalGate;

/// One incoming user turn
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// The user's message
    pub text: String,
    /// Agent the user explicitly selected for this turn, if any
    pub select_agent: Option<AgentKind>,
}

impl TurnRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            select_agent: None,
        }
    }

    pub fn with_agent(mut self, agent: AgentKind) -> Self {
        self.select_agent = Some(agent);
        self
    }
}

/// Routing outcome for one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    /// Agent that will handle the turn
    pub agent: AgentKind,
    /// The turn asked for plan generation while the gate is shut; the
    /// coordinator answers but the user's routing intent still sticks
    pub gated: bool,
    /// Agent the precedence rules picked before gating
    pub selected: AgentKind,
}

const PLAN_PHRASES: [&str; 4] = ["generate a plan", "generate the plan", "project plan", "generate plan"];

/// Keyword table for content-hint routing, checked in order
const CONTENT_HINTS: [(&str, AgentKind); 16] = [
    ("budget", AgentKind::Financial),
    ("cost", AgentKind::Financial),
    ("sponsor", AgentKind::Financial),
    ("venue", AgentKind::ResourcePlanning),
    ("vendor", AgentKind::ResourcePlanning),
    ("catering", AgentKind::ResourcePlanning),
    ("stakeholder", AgentKind::StakeholderManagement),
    ("speaker", AgentKind::StakeholderManagement),
    ("vip", AgentKind::StakeholderManagement),
    ("marketing", AgentKind::MarketingCommunications),
    ("promotion", AgentKind::MarketingCommunications),
    ("social media", AgentKind::MarketingCommunications),
    ("timeline", AgentKind::ProjectManagement),
    ("milestone", AgentKind::ProjectManagement),
    ("survey", AgentKind::Analytics),
    ("permit", AgentKind::ComplianceSecurity),
];

/// Whether the text asks for project plan generation
pub fn wants_plan(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLAN_PHRASES.iter().any(|p| lower.contains(p))
}

/// First specialist whose keyword table matches the text
pub fn content_hint(text: &str) -> Option<AgentKind> {
    let lower = text.to_lowercase();
    CONTENT_HINTS.iter().find(|(kw, _)| lower.contains(kw)).map(|(_, agent)| *agent)
}

/// Decide who handles this turn
pub fn route(
    request: &TurnRequest,
    active_agent: Option<AgentKind>,
    pending_handoff: bool,
    gate: &ProposalGate,
) -> RouteDecision {
    let selected = if let Some(agent) = request.select_agent {
        agent
    } else if let Some(agent) = active_agent
        && !pending_handoff
    {
        agent
    } else if let Some(agent) = content_hint(&request.text) {
        agent
    } else {
        AgentKind::Coordinator
    };

    if wants_plan(&request.text) && !gate.can_generate_plan() {
        return RouteDecision {
            agent: AgentKind::Coordinator,
            gated: true,
            selected,
        };
    }

    RouteDecision {
        agent: selected,
        gated: false,
        selected,
    }
}
