//! Turn engine
//!
//! The single mutation path for conversational turns: route the turn,
//! call the chosen agent under a timeout, stage the reply's proposed
//! mutations against clones of the ledger and gate, then commit
//! everything or nothing. A turn that errors leaves the session
//! exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{Delta, Session, TaskChange, TaskChangeKind};
use crate::agents::{Agent, AgentAction, AgentError, AgentKind, AgentRegistry, TaskSeed, TurnContext};
use crate::config::Config;
use crate::domain::{Message, Task};
use crate::error::OrchestratorError;
use crate::router::{self, TurnRequest};

/// Caller-held side of a turn cancellation pair
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

impl CancelHandle {
    /// Cancel the in-flight turn; a no-op if it already finished
    pub fn cancel(self) {
        let _ = self.tx.send(());
    }
}

/// Engine-held side of a turn cancellation pair
pub struct CancelToken {
    rx: oneshot::Receiver<()>,
}

impl CancelToken {
    /// Create a linked handle/token pair
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = oneshot::channel();
        (CancelHandle { tx }, CancelToken { rx })
    }

    /// Resolves only when the handle fires. A dropped handle means
    /// the turn can no longer be cancelled, not that it was.
    async fn cancelled(self) {
        if self.rx.await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}

/// Applies turns to sessions
pub struct TurnEngine {
    registry: Arc<AgentRegistry>,
    timeout: Duration,
    coordinator_fallback: bool,
}

impl TurnEngine {
    pub fn new(registry: Arc<AgentRegistry>, config: &Config) -> Self {
        Self {
            registry,
            timeout: Duration::from_millis(config.agent.timeout_ms),
            coordinator_fallback: config.agent.coordinator_fallback,
        }
    }

    /// Handle one user turn end to end. On success the session holds
    /// the new messages and any staged mutations; on error it is
    /// untouched.
    pub async fn apply_turn(
        &self,
        session: &mut Session,
        request: TurnRequest,
        cancel: Option<CancelToken>,
    ) -> Result<Delta, OrchestratorError> {
        let decision = router::route(&request, session.active_agent, session.pending_handoff, &session.gate);
        debug!(
            session_id = %session.id,
            agent = %decision.agent,
            gated = decision.gated,
            "turn routed"
        );

        let ctx = TurnContext {
            text: request.text.clone(),
            active_agent: session.active_agent,
            proposal_status: session.gate.status(),
            plan_allowed: session.gate.can_generate_plan(),
            gated: decision.gated,
            event: session.event.clone(),
            progress: session.ledger.progress(),
        };

        let (answered_by, reply) = self.call_with_fallback(decision.agent, &ctx, cancel).await?;

        // Stage every proposed mutation against clones; nothing
        // touches the session until all of them succeed.
        let mut ledger = session.ledger.clone();
        let mut gate = session.gate.clone();
        let mut task_changes = Vec::new();
        for action in &reply.actions {
            match action {
                AgentAction::CreateTask(seed) => {
                    let task = ledger.create(build_task(seed)).clone();
                    task_changes.push(TaskChange {
                        kind: TaskChangeKind::Created,
                        task,
                    });
                }
                AgentAction::GeneratePlan(seeds) => {
                    if !gate.can_generate_plan() {
                        warn!(session_id = %session.id, agent = %answered_by, "plan action dropped, gate is shut");
                        continue;
                    }
                    for seed in seeds {
                        let task = ledger.create(build_task(seed)).clone();
                        task_changes.push(TaskChange {
                            kind: TaskChangeKind::Created,
                            task,
                        });
                    }
                }
                AgentAction::SubmitProposal { content } => {
                    gate.submit_draft(content.clone())?;
                }
            }
        }

        let proposal_status = (gate.status() != session.gate.status()).then(|| gate.status());
        let active_changed = session.active_agent != Some(decision.selected);

        // Commit
        let user_message = Message::user(request.text);
        let agent_message = Message::agent(answered_by, reply.content);
        session.messages.push(user_message.clone());
        session.messages.push(agent_message.clone());
        session.ledger = ledger;
        session.gate = gate;
        session.active_agent = Some(decision.selected);
        session.pending_handoff = reply.handoff;
        session.touch();

        Ok(Delta {
            session_id: session.id.clone(),
            messages: vec![user_message, agent_message],
            task_changes,
            proposal_status,
            active_agent: active_changed.then_some(decision.selected),
        })
    }

    /// Call the routed agent; on a retryable failure, fall back to
    /// the coordinator once so the turn still gets an answer
    async fn call_with_fallback(
        &self,
        kind: AgentKind,
        ctx: &TurnContext,
        cancel: Option<CancelToken>,
    ) -> Result<(AgentKind, crate::agents::AgentReply), OrchestratorError> {
        let agent = self.lookup(kind)?;
        match self.call_agent(kind, agent, ctx, cancel).await {
            Ok(reply) => Ok((kind, reply)),
            Err(err) if err.is_retryable() && self.coordinator_fallback && kind != AgentKind::Coordinator => {
                warn!(agent = %kind, error = %err, "agent failed, falling back to coordinator");
                let coordinator = self.lookup(AgentKind::Coordinator)?;
                let reply = self
                    .call_agent(AgentKind::Coordinator, coordinator, ctx, None)
                    .await
                    .map_err(|e| OrchestratorError::AgentUnavailable {
                        agent: AgentKind::Coordinator,
                        reason: e.to_string(),
                    })?;
                Ok((AgentKind::Coordinator, reply))
            }
            Err(err) => Err(OrchestratorError::AgentUnavailable {
                agent: kind,
                reason: err.to_string(),
            }),
        }
    }

    fn lookup(&self, kind: AgentKind) -> Result<Arc<dyn Agent>, OrchestratorError> {
        self.registry.get(kind).ok_or_else(|| OrchestratorError::AgentUnavailable {
            agent: kind,
            reason: "not registered".to_string(),
        })
    }

    async fn call_agent(
        &self,
        kind: AgentKind,
        agent: Arc<dyn Agent>,
        ctx: &TurnContext,
        cancel: Option<CancelToken>,
    ) -> Result<crate::agents::AgentReply, AgentError> {
        let cancelled = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => futures::future::pending().await,
            }
        };

        tokio::select! {
            _ = cancelled => {
                debug!(agent = %kind, "turn cancelled");
                Err(AgentError::Cancelled)
            }
            result = tokio::time::timeout(self.timeout, agent.handle_turn(ctx)) => {
                match result {
                    Ok(reply) => reply,
                    Err(_) => Err(AgentError::Timeout(self.timeout)),
                }
            }
        }
    }
}

fn build_task(seed: &TaskSeed) -> Task {
    let mut task = Task::new(seed.title.clone(), seed.description.clone(), seed.agent);
    if let Some(recurrence) = &seed.recurrence {
        let anchor = seed.due.unwrap_or_else(crate::domain::today);
        task = task.with_recurrence(recurrence.clone(), anchor);
    } else if let Some(due) = seed.due {
        task = task.with_due(due);
    }
    task
}
