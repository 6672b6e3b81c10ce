//! Built-in deterministic agent implementations
//!
//! These stand behind the [`Agent`] seam where a hosted model or an
//! external capability service would plug in. They answer from
//! templates and simple text inspection, which keeps the orchestrator
//! fully testable without network access.

use async_trait::async_trait;

use super::{Agent, AgentAction, AgentError, AgentKind, AgentReply, TaskSeed, TurnContext};
use crate::gate::ProposalStatus;
use crate::router;

/// The general coordinator: clarifies intent, explains the proposal
/// workflow, and generates the project plan once the gate opens
pub struct CoordinatorAgent;

#[async_trait]
impl Agent for CoordinatorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Coordinator
    }

    async fn handle_turn(&self, ctx: &TurnContext) -> Result<AgentReply, AgentError> {
        if ctx.gated {
            return Ok(AgentReply::text(gate_explanation(ctx.proposal_status)));
        }

        let text = ctx.text.to_lowercase();

        if router::wants_plan(&ctx.text) && ctx.plan_allowed {
            let seeds = plan_seeds(ctx);
            let count = seeds.len();
            return Ok(AgentReply::text(format!(
                "The proposal is approved, so I've drawn up the project plan: {} tasks across the specialist teams. \
                 Use the task board to track them, or ask a specialist to refine their slice.",
                count
            ))
            .with_action(AgentAction::GeneratePlan(seeds)));
        }

        if ctx.proposal_status == ProposalStatus::Absent && text.contains("proposal") {
            return Ok(AgentReply::text(
                "I've drafted that as the session proposal. Review it and approve it when you're ready; \
                 approval unlocks project plan generation.",
            )
            .with_action(AgentAction::SubmitProposal {
                content: ctx.text.clone(),
            }));
        }

        if let Some(hint) = router::content_hint(&ctx.text) {
            return Ok(AgentReply::text(format!(
                "That sounds like a question for {} ({}). Select them to continue, or keep talking to me.",
                hint.label(),
                hint.description()
            )));
        }

        Ok(AgentReply::text(clarifying_response(ctx)))
    }
}

/// A templated specialist for every non-coordinator variant
pub struct SpecialistAgent {
    kind: AgentKind,
}

impl SpecialistAgent {
    pub fn new(kind: AgentKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    fn kind(&self) -> AgentKind {
        self.kind
    }

    async fn handle_turn(&self, ctx: &TurnContext) -> Result<AgentReply, AgentError> {
        let text = ctx.text.to_lowercase();

        if router::wants_plan(&ctx.text) && ctx.plan_allowed {
            let seeds: Vec<TaskSeed> = plan_seeds(ctx).into_iter().filter(|s| s.agent == self.kind).collect();
            return Ok(AgentReply::text(format!(
                "Here's the {} slice of the plan: {} tasks added to the ledger.",
                self.kind.label(),
                seeds.len()
            ))
            .with_action(AgentAction::GeneratePlan(seeds)));
        }

        if let Some(title) = extract_task_title(&ctx.text) {
            return Ok(AgentReply::text(format!(
                "Added \"{}\" to the task list under {}.",
                title,
                self.kind.label()
            ))
            .with_action(AgentAction::CreateTask(TaskSeed::new(title, ctx.text.clone(), self.kind))));
        }

        if text.contains("hand off") || text.contains("back to coordinator") || text.contains("that's all") {
            return Ok(AgentReply::text(format!(
                "Handing back to the coordinator - {} items are on my list if you need me again.",
                ctx.progress.total
            ))
            .with_handoff());
        }

        Ok(AgentReply::text(specialist_response(self.kind, ctx)))
    }
}

/// Why the requested action is blocked, phrased for the user
fn gate_explanation(status: ProposalStatus) -> String {
    match status {
        ProposalStatus::Absent => "I can't generate a project plan yet - this session has no proposal. \
             Describe what you want to put on (say \"proposal: ...\") and approve it; then I'll build the plan."
            .to_string(),
        ProposalStatus::Draft => "The proposal is drafted but not yet approved. Approve it and I'll generate the project plan."
            .to_string(),
        ProposalStatus::Approved => {
            // Router never gates an approved session; kept for completeness
            "The proposal is approved - ask me to generate the plan.".to_string()
        }
    }
}

fn clarifying_response(ctx: &TurnContext) -> String {
    let mut response = String::from("I coordinate the planning specialists: ");
    let names: Vec<&str> = AgentKind::ALL
        .iter()
        .filter(|k| **k != AgentKind::Coordinator)
        .map(|k| k.label())
        .collect();
    response.push_str(&names.join(", "));
    response.push('.');

    match ctx.proposal_status {
        ProposalStatus::Absent => {
            response.push_str(" To get started, describe your event as a proposal and approve it.");
        }
        ProposalStatus::Draft => {
            response.push_str(" Your proposal is drafted - approve it to unlock plan generation.");
        }
        ProposalStatus::Approved => {
            response.push_str(" The proposal is approved; ask for the project plan whenever you're ready.");
        }
    }
    response
}

fn specialist_response(kind: AgentKind, ctx: &TurnContext) -> String {
    let mut response = format!("{} here - {}.", kind.label(), kind.description());
    if let Some(event) = &ctx.event {
        response.push_str(&format!(
            " For \"{}\" ({}, starting {}), tell me what you'd like to pin down, or say \"add a task: ...\".",
            event.title, event.kind, event.start
        ));
    } else {
        response.push_str(" Tell me what you'd like to pin down, or say \"add a task: ...\".");
    }
    response
}

/// Pull a task title out of "add a task: ..." style requests
fn extract_task_title(text: &str) -> Option<String> {
    let start = ["add a task:", "add task:", "create a task:", "create task:", "task:"]
        .iter()
        .find_map(|m| find_ascii_ignore_case(text, m).map(|i| i + m.len()))?;
    let title = text[start..].trim().trim_end_matches('.');
    if title.is_empty() { None } else { Some(title.to_string()) }
}

/// Byte-wise ASCII case-insensitive substring search. The returned
/// offset is valid for slicing `haystack`: every matched byte is
/// ASCII, so both ends land on char boundaries. Unicode case folding
/// (`to_lowercase`) can change byte lengths, which makes its offsets
/// unusable against the original string.
fn find_ascii_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// The standard project plan, spread across the specialist teams
fn plan_seeds(ctx: &TurnContext) -> Vec<TaskSeed> {
    let subject = ctx
        .event
        .as_ref()
        .map(|e| e.title.clone())
        .unwrap_or_else(|| "the event".to_string());

    vec![
        TaskSeed::new(
            "Shortlist and book the venue",
            format!("Identify candidate venues for {} and confirm the booking", subject),
            AgentKind::ResourcePlanning,
        ),
        TaskSeed::new(
            "Arrange catering and equipment",
            format!("Source catering, AV and furniture for {}", subject),
            AgentKind::ResourcePlanning,
        ),
        TaskSeed::new(
            "Draft the budget",
            format!("Build the line-item budget for {} and set the approval threshold", subject),
            AgentKind::Financial,
        ),
        TaskSeed::new(
            "Confirm speakers and VIPs",
            format!("Invite and confirm key participants for {}", subject),
            AgentKind::StakeholderManagement,
        ),
        TaskSeed::new(
            "Announce and open registration",
            format!("Publish the announcement and invitations for {}", subject),
            AgentKind::MarketingCommunications,
        ),
        TaskSeed::new(
            "Build the delivery timeline",
            format!("Lay out milestones and dependencies for {}", subject),
            AgentKind::ProjectManagement,
        ),
        TaskSeed::new(
            "Set up attendance tracking",
            format!("Prepare registration metrics and the post-event survey for {}", subject),
            AgentKind::Analytics,
        ),
        TaskSeed::new(
            "Secure permits and insurance",
            format!("File permits and confirm liability cover for {}", subject),
            AgentKind::ComplianceSecurity,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Progress;

    fn ctx(text: &str, proposal: ProposalStatus, gated: bool) -> TurnContext {
        TurnContext {
            text: text.to_string(),
            active_agent: None,
            proposal_status: proposal,
            plan_allowed: proposal == ProposalStatus::Approved,
            gated,
            event: None,
            progress: Progress::default(),
        }
    }

    #[tokio::test]
    async fn test_coordinator_explains_gate() {
        let agent = CoordinatorAgent;
        let reply = agent
            .handle_turn(&ctx("generate the project plan", ProposalStatus::Absent, true))
            .await
            .unwrap();
        assert!(reply.content.contains("no proposal"));
        assert!(reply.actions.is_empty());
    }

    #[tokio::test]
    async fn test_coordinator_generates_plan_when_allowed() {
        let agent = CoordinatorAgent;
        let reply = agent
            .handle_turn(&ctx("generate the project plan", ProposalStatus::Approved, false))
            .await
            .unwrap();
        assert_eq!(reply.actions.len(), 1);
        match &reply.actions[0] {
            AgentAction::GeneratePlan(seeds) => assert!(!seeds.is_empty()),
            other => panic!("expected GeneratePlan, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_coordinator_drafts_proposal() {
        let agent = CoordinatorAgent;
        let reply = agent
            .handle_turn(&ctx(
                "proposal: a 200-person product launch in June",
                ProposalStatus::Absent,
                false,
            ))
            .await
            .unwrap();
        assert!(matches!(reply.actions.first(), Some(AgentAction::SubmitProposal { .. })));
    }

    #[tokio::test]
    async fn test_specialist_creates_ad_hoc_task() {
        let agent = SpecialistAgent::new(AgentKind::Financial);
        let reply = agent
            .handle_turn(&ctx("add a task: negotiate the AV quote", ProposalStatus::Absent, false))
            .await
            .unwrap();
        match &reply.actions[0] {
            AgentAction::CreateTask(seed) => {
                assert_eq!(seed.title, "negotiate the AV quote");
                assert_eq!(seed.agent, AgentKind::Financial);
            }
            other => panic!("expected CreateTask, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_specialist_hands_off() {
        let agent = SpecialistAgent::new(AgentKind::Analytics);
        let reply = agent
            .handle_turn(&ctx("that's all for now", ProposalStatus::Absent, false))
            .await
            .unwrap();
        assert!(reply.handoff);
    }

    #[test]
    fn test_extract_task_title() {
        assert_eq!(
            extract_task_title("Please add a task: chase the caterer."),
            Some("chase the caterer".to_string())
        );
        assert_eq!(extract_task_title("ADD A TASK: Follow up"), Some("Follow up".to_string()));
        assert_eq!(extract_task_title("task:   "), None);
        assert_eq!(extract_task_title("no marker here"), None);
    }

    #[test]
    fn test_extract_task_title_multibyte_text() {
        // 'İ' lowercases to two chars, so lowercase-derived offsets
        // would misalign against the original string
        assert_eq!(extract_task_title("İ add a task:étude"), Some("étude".to_string()));
        assert_eq!(extract_task_title("café task: raccommoder la nappe"), Some("raccommoder la nappe".to_string()));
    }

    #[tokio::test]
    async fn test_specialist_survives_multibyte_task_request() {
        let agent = SpecialistAgent::new(AgentKind::ResourcePlanning);
        let reply = agent
            .handle_turn(&ctx("İ add a task:étude", ProposalStatus::Absent, false))
            .await
            .unwrap();
        match &reply.actions[0] {
            AgentAction::CreateTask(seed) => assert_eq!(seed.title, "étude"),
            other => panic!("expected CreateTask, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_seeds_cover_every_specialist() {
        let seeds = plan_seeds(&ctx("", ProposalStatus::Approved, false));
        for kind in AgentKind::ALL.iter().filter(|k| **k != AgentKind::Coordinator) {
            assert!(seeds.iter().any(|s| s.agent == *kind), "no seed for {}", kind);
        }
    }
}
