//! Proposal gate
//!
//! One proposal per session, moving monotonically through
//! Absent -> Draft -> Approved. Plan generation stays locked until the
//! gate reaches Approved; there is no rejection or withdrawal edge, so
//! the gate can never regress.

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Where the session's proposal stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// No proposal has been submitted
    #[default]
    Absent,
    /// Submitted, awaiting approval
    Draft,
    /// Approved; plan generation is unlocked
    Approved,
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Draft => write!(f, "draft"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

/// The session's single proposal and its approval state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalGate {
    status: ProposalStatus,
    content: Option<String>,
}

impl ProposalGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    /// Proposal text, once one has been submitted
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Whether plan generation is unlocked
    pub fn can_generate_plan(&self) -> bool {
        self.status == ProposalStatus::Approved
    }

    /// Submit the session's proposal draft. Only legal from Absent;
    /// a session's proposal is never replaced or resubmitted.
    pub fn submit_draft(&mut self, content: impl Into<String>) -> Result<(), OrchestratorError> {
        if self.status != ProposalStatus::Absent {
            return Err(OrchestratorError::ProposalAlreadyExists);
        }
        self.status = ProposalStatus::Draft;
        self.content = Some(content.into());
        Ok(())
    }

    /// Approve the drafted proposal. Only legal from Draft.
    pub fn approve(&mut self) -> Result<(), OrchestratorError> {
        if self.status != ProposalStatus::Draft {
            return Err(OrchestratorError::ProposalNotDraft(self.status));
        }
        self.status = ProposalStatus::Approved;
        Ok(())
    }
}
