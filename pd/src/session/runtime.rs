//! Session runtime - one actor task per session
//!
//! Each session runs as its own tokio task owning the session state
//! exclusively. Requests arrive over an mpsc channel and are handled
//! one at a time, which serializes all mutations of a session while
//! leaving different sessions fully parallel. Every mutation's delta
//! is fanned out to the session's delivery channels before the caller
//! gets its reply.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use evcal::RecurrenceSpec;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::engine::{CancelToken, TurnEngine};
use super::{Delta, Session, SessionSnapshot};
use crate::agents::{AgentKind, AgentRegistry};
use crate::config::Config;
use crate::delivery::DeliveryChannel;
use crate::domain::{Event, Task, TaskStatus};
use crate::error::OrchestratorError;
use crate::ledger::{Progress, TaskFilter};
use crate::router::TurnRequest;

type Reply<T> = oneshot::Sender<T>;
type MutationReply = Reply<Result<Delta, OrchestratorError>>;

/// Requests a session actor understands
pub enum SessionRequest {
    Turn {
        request: TurnRequest,
        cancel: Option<CancelToken>,
        reply_tx: MutationReply,
    },
    SubmitProposal {
        content: String,
        reply_tx: MutationReply,
    },
    ApproveProposal {
        reply_tx: MutationReply,
    },
    CreateTask {
        title: String,
        description: String,
        agent: AgentKind,
        due: Option<NaiveDate>,
        recurrence: Option<RecurrenceSpec>,
        reply_tx: MutationReply,
    },
    TransitionTask {
        id: String,
        next: TaskStatus,
        reply_tx: MutationReply,
    },
    RollForward {
        today: NaiveDate,
        reply_tx: MutationReply,
    },
    SetEvent {
        event: Event,
        reply_tx: MutationReply,
    },
    Tasks {
        filter: TaskFilter,
        reply_tx: Reply<Vec<Task>>,
    },
    Progress {
        reply_tx: Reply<Progress>,
    },
    Snapshot {
        reply_tx: Reply<SessionSnapshot>,
    },
    ExportCalendar {
        reply_tx: Reply<String>,
    },
    Subscribe {
        channel: DeliveryChannel,
    },
    Shutdown,
}

/// Cloneable client interface to one session actor
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    tx: mpsc::Sender<SessionRequest>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, request: SessionRequest) -> Result<(), OrchestratorError> {
        self.tx.send(request).await.map_err(|_| OrchestratorError::SessionClosed)
    }

    async fn mutate(
        &self,
        make: impl FnOnce(MutationReply) -> SessionRequest,
    ) -> Result<Delta, OrchestratorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| OrchestratorError::SessionClosed)?
    }

    async fn query<T>(&self, make: impl FnOnce(Reply<T>) -> SessionRequest) -> Result<T, OrchestratorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| OrchestratorError::SessionClosed)
    }

    /// Send one user turn and wait for its delta
    pub async fn turn(&self, request: TurnRequest) -> Result<Delta, OrchestratorError> {
        self.mutate(|reply_tx| SessionRequest::Turn {
            request,
            cancel: None,
            reply_tx,
        })
        .await
    }

    /// Send one user turn with a cancellation token attached
    pub async fn turn_cancellable(&self, request: TurnRequest, cancel: CancelToken) -> Result<Delta, OrchestratorError> {
        self.mutate(|reply_tx| SessionRequest::Turn {
            request,
            cancel: Some(cancel),
            reply_tx,
        })
        .await
    }

    pub async fn submit_proposal(&self, content: impl Into<String>) -> Result<Delta, OrchestratorError> {
        let content = content.into();
        self.mutate(|reply_tx| SessionRequest::SubmitProposal { content, reply_tx }).await
    }

    pub async fn approve_proposal(&self) -> Result<Delta, OrchestratorError> {
        self.mutate(|reply_tx| SessionRequest::ApproveProposal { reply_tx }).await
    }

    pub async fn create_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        agent: AgentKind,
        due: Option<NaiveDate>,
        recurrence: Option<RecurrenceSpec>,
    ) -> Result<Delta, OrchestratorError> {
        let title = title.into();
        let description = description.into();
        self.mutate(|reply_tx| SessionRequest::CreateTask {
            title,
            description,
            agent,
            due,
            recurrence,
            reply_tx,
        })
        .await
    }

    pub async fn transition_task(&self, id: impl Into<String>, next: TaskStatus) -> Result<Delta, OrchestratorError> {
        let id = id.into();
        self.mutate(|reply_tx| SessionRequest::TransitionTask { id, next, reply_tx }).await
    }

    pub async fn roll_forward(&self, today: NaiveDate) -> Result<Delta, OrchestratorError> {
        self.mutate(|reply_tx| SessionRequest::RollForward { today, reply_tx }).await
    }

    pub async fn set_event(&self, event: Event) -> Result<Delta, OrchestratorError> {
        self.mutate(|reply_tx| SessionRequest::SetEvent { event, reply_tx }).await
    }

    pub async fn tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, OrchestratorError> {
        self.query(|reply_tx| SessionRequest::Tasks { filter, reply_tx }).await
    }

    pub async fn progress(&self) -> Result<Progress, OrchestratorError> {
        self.query(|reply_tx| SessionRequest::Progress { reply_tx }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, OrchestratorError> {
        self.query(|reply_tx| SessionRequest::Snapshot { reply_tx }).await
    }

    pub async fn export_calendar(&self) -> Result<String, OrchestratorError> {
        self.query(|reply_tx| SessionRequest::ExportCalendar { reply_tx }).await
    }

    /// Attach a delivery channel; every future delta is pushed to it
    pub async fn subscribe(&self, channel: DeliveryChannel) -> Result<(), OrchestratorError> {
        self.send(SessionRequest::Subscribe { channel }).await
    }

    /// Ask the actor to stop after draining queued requests
    pub async fn shutdown(&self) -> Result<(), OrchestratorError> {
        self.send(SessionRequest::Shutdown).await
    }
}

/// Creates sessions and tracks their handles
pub struct SessionManager {
    registry: Arc<AgentRegistry>,
    config: Config,
    sessions: HashMap<String, SessionHandle>,
}

impl SessionManager {
    pub fn new(registry: Arc<AgentRegistry>, config: Config) -> Self {
        Self {
            registry,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Spawn a new session actor and return its handle
    pub fn create_session(&mut self, name: &str) -> SessionHandle {
        let session = Session::new(name);
        let id = session.id.clone();
        let engine = TurnEngine::new(self.registry.clone(), &self.config);
        let (tx, rx) = mpsc::channel(self.config.session.request_buffer);

        tokio::spawn(run_session(session, engine, rx));

        let handle = SessionHandle { id: id.clone(), tx };
        self.sessions.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).cloned()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// The actor loop: exclusive owner of one session's state
async fn run_session(mut session: Session, engine: TurnEngine, mut rx: mpsc::Receiver<SessionRequest>) {
    let session_id = session.id.clone();
    let mut channels: Vec<DeliveryChannel> = Vec::new();
    info!(%session_id, "session actor started");

    while let Some(request) = rx.recv().await {
        match request {
            SessionRequest::Turn {
                request,
                cancel,
                reply_tx,
            } => {
                let result = engine.apply_turn(&mut session, request, cancel).await;
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::SubmitProposal { content, reply_tx } => {
                let result = session.submit_proposal(content);
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::ApproveProposal { reply_tx } => {
                let result = session.approve_proposal();
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::CreateTask {
                title,
                description,
                agent,
                due,
                recurrence,
                reply_tx,
            } => {
                let result = session.create_task(title, description, agent, due, recurrence.as_ref());
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::TransitionTask { id, next, reply_tx } => {
                let result = session.transition_task(&id, next);
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::RollForward { today, reply_tx } => {
                let result = Ok(session.roll_forward(today));
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::SetEvent { event, reply_tx } => {
                let result = Ok(session.set_event(event));
                publish_and_reply(&session_id, &mut channels, result, reply_tx);
            }
            SessionRequest::Tasks { filter, reply_tx } => {
                let _ = reply_tx.send(session.tasks(&filter));
            }
            SessionRequest::Progress { reply_tx } => {
                let _ = reply_tx.send(session.progress());
            }
            SessionRequest::Snapshot { reply_tx } => {
                let _ = reply_tx.send(session.snapshot());
            }
            SessionRequest::ExportCalendar { reply_tx } => {
                let _ = reply_tx.send(session.export_calendar());
            }
            SessionRequest::Subscribe { channel } => {
                channels.push(channel);
            }
            SessionRequest::Shutdown => break,
        }
    }

    info!(%session_id, "session actor stopped");
}

/// Fan a successful mutation's delta out to every subscriber, then
/// answer the caller. Deltas are published in mutation order because
/// the actor handles one request at a time.
fn publish_and_reply(
    session_id: &str,
    channels: &mut [DeliveryChannel],
    result: Result<Delta, OrchestratorError>,
    reply_tx: MutationReply,
) {
    if let Ok(delta) = &result
        && !delta.is_empty()
    {
        for channel in channels.iter_mut() {
            if let Err(e) = channel.push(delta.clone()) {
                warn!(%session_id, error = %e, "delta delivery failed");
            }
        }
    }
    let _ = reply_tx.send(result);
}
