//! Agent conversation session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A resumable conversation with the delegated agent, bound to one calendar
/// day and one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    /// Conversation handle returned by the agent runtime.
    pub session_id: String,
    /// Calendar day the handle was last stored.
    pub date: NaiveDate,
    /// Organization the conversation is scoped to.
    pub organization_id: String,
}

impl AgentSession {
    pub fn new(
        session_id: impl Into<String>,
        date: NaiveDate,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            date,
            organization_id: organization_id.into(),
        }
    }
}
