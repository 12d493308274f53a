//! Delegated agent runtime seam.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

/// One piece of the agent's streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyFragment {
    /// A text block of the assistant's reply, in arrival order.
    Text(String),
    /// Terminal fragment carrying the conversation handle to resume later.
    Result {
        /// Conversation handle.
        session_id: String,
    },
}

/// Finite, single-use stream of reply fragments.
pub type ReplyStream = BoxStream<'static, Result<ReplyFragment>>;

/// A single message sent to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    /// User message.
    pub message: String,
    /// System prompt for a new conversation.
    pub system_prompt: Option<String>,
    /// Conversation handle to resume.
    pub resume: Option<String>,
}

impl AgentRequest {
    /// Start a new conversation with the given system prompt.
    pub fn new_conversation(message: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            system_prompt: Some(system_prompt.into()),
            resume: None,
        }
    }

    /// Continue an existing conversation.
    pub fn resume(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            system_prompt: None,
            resume: Some(session_id.into()),
        }
    }
}

/// Runs the delegated agent for one message.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Start the agent and return its reply stream.
    async fn start(&self, request: AgentRequest) -> Result<ReplyStream>;
}
