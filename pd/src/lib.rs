//! Plannerd - conversational event planning orchestrator
//!
//! Plannerd coordinates a catalog of planning specialists behind a
//! single conversation. Each session runs as its own actor owning its
//! message log, task ledger, and proposal gate; turns route to one
//! agent, mutations commit all-or-nothing, and every change streams
//! to subscribed clients as a delta.
//!
//! # Core Concepts
//!
//! - **One actor per session**: mutations of a session are serialized,
//!   different sessions run fully parallel
//! - **Proposal gate**: plan generation stays locked until the
//!   session's proposal is approved, and the gate never regresses
//! - **Deltas, not snapshots**: every mutation yields an incremental
//!   delta; clients resynchronize from a snapshot only after loss
//! - **Recurrence via `evcal`**: recurring tasks and events compile
//!   their rules once and derive occurrences on demand
//!
//! # Modules
//!
//! - [`agents`] - Agent catalog, trait, and built-in implementations
//! - [`session`] - Session state, turn engine, and per-session actors
//! - [`ledger`] - Task store with transition rules and progress
//! - [`gate`] - Proposal workflow gate
//! - [`router`] - Turn routing precedence
//! - [`delivery`] - Realtime delta delivery to clients
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agents;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod repl;
pub mod router;
pub mod session;

// Re-export commonly used types
pub use agents::{Agent, AgentAction, AgentError, AgentKind, AgentRegistry, AgentReply, TaskSeed, TurnContext};
pub use config::{Config, DeliveryConfig};
pub use delivery::{ClientSignal, ConnectionState, DeliveryChannel, ReconnectBackoff};
pub use domain::{Event, EventStatus, Message, Role, Task, TaskStatus};
pub use error::{ErrorObject, OrchestratorError};
pub use gate::{ProposalGate, ProposalStatus};
pub use ledger::{Progress, TaskFilter, TaskLedger, TransitionOutcome};
pub use router::{RouteDecision, TurnRequest};
pub use session::{
    CancelHandle, CancelToken, Delta, Session, SessionHandle, SessionManager, SessionSnapshot, TurnEngine,
};
