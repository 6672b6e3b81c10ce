//! Conversation message type
//!
//! Messages are immutable once appended to a session's log and are
//! strictly ordered by arrival.

use serde::{Deserialize, Serialize};

use super::{generate_id, now_ms};
use crate::agents::AgentKind;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// One turn's worth of text in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier
    pub id: String,

    /// Author role
    pub role: Role,

    /// Originating agent, set for agent messages only
    pub agent: Option<AgentKind>,

    /// Message text
    pub content: String,

    /// Arrival timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_id("msg", "user"),
            role: Role::User,
            agent: None,
            content: content.into(),
            created_at: now_ms(),
        }
    }

    /// Create an agent message
    pub fn agent(agent: AgentKind, content: impl Into<String>) -> Self {
        Self {
            id: generate_id("msg", "agent"),
            role: Role::Agent,
            agent: Some(agent),
            content: content.into(),
            created_at: now_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.agent, None);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_agent_message() {
        let msg = Message::agent(AgentKind::Financial, "Budget drafted");
        assert_eq!(msg.role, Role::Agent);
        assert_eq!(msg.agent, Some(AgentKind::Financial));
    }

    #[test]
    fn test_message_serde() {
        let msg = Message::agent(AgentKind::Coordinator, "Hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"agent\""));
        assert!(json.contains("\"coordinator\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
