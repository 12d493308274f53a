//! Agent facade: one message in, one reply out.

use std::sync::Arc;

use futures::StreamExt;
use realstate_core::escape_markdown_v2;
use realstate_core::prompts::{build_system_prompt, AGENT_FAILURE_MESSAGE, EMPTY_REPLY_MESSAGE};
use realstate_models::AgentSession;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::runtime::{AgentRequest, AgentRuntime, ReplyFragment};
use crate::session_store::{is_session_valid, SessionStore};

/// Organizational identity of the caller, embedded in the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext {
    pub organization_id: String,
    pub organization_name: String,
    pub user_name: String,
}

impl OrgContext {
    pub fn new(
        organization_id: impl Into<String>,
        organization_name: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            organization_name: organization_name.into(),
            user_name: user_name.into(),
        }
    }
}

/// Property-management assistant backed by a delegated agent runtime.
pub struct PropertyAgent {
    runtime: Arc<dyn AgentRuntime>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl PropertyAgent {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            runtime,
            sessions,
            clock,
        }
    }

    /// Conversation handle to resume, if the stored session is still valid.
    async fn resumable_session(&self, telegram_id: i64, organization_id: &str) -> Option<String> {
        let session = self.sessions.get(telegram_id).await?;
        if is_session_valid(&session, self.clock.today(), organization_id) {
            Some(session.session_id)
        } else {
            debug!(telegram_id, "Stored session expired or bound to another organization");
            None
        }
    }

    /// Forget the user's conversation so the next message starts fresh.
    pub async fn clear_session(&self, telegram_id: i64) {
        if self.sessions.remove(telegram_id).await.is_some() {
            debug!(telegram_id, "Agent session cleared");
        }
    }

    /// Relay one message to the agent and return its reply, ready to send as
    /// MarkdownV2.
    ///
    /// Never fails: invocation errors purge the user's session and yield a
    /// generic message.
    pub async fn process_message(
        &self,
        telegram_id: i64,
        message: &str,
        context: &OrgContext,
    ) -> String {
        let request = match self
            .resumable_session(telegram_id, &context.organization_id)
            .await
        {
            Some(session_id) => AgentRequest::resume(message, session_id),
            None => AgentRequest::new_conversation(
                message,
                build_system_prompt(
                    &context.organization_id,
                    &context.organization_name,
                    &context.user_name,
                ),
            ),
        };
        let resumed = request.resume.is_some();

        match self.invoke(request).await {
            Ok((text, session_id)) => {
                if let Some(session_id) = session_id {
                    self.sessions
                        .put(
                            telegram_id,
                            AgentSession::new(
                                session_id,
                                self.clock.today(),
                                context.organization_id.clone(),
                            ),
                        )
                        .await;
                }
                info!(telegram_id, resumed, chars = text.len(), "Agent replied");
                if text.is_empty() {
                    escape_markdown_v2(EMPTY_REPLY_MESSAGE)
                } else {
                    text
                }
            }
            Err(e) => {
                error!(telegram_id, error = %e, "Error processing message");
                self.clear_session(telegram_id).await;
                escape_markdown_v2(AGENT_FAILURE_MESSAGE)
            }
        }
    }

    /// Drain the reply stream, concatenating text and capturing the handle.
    async fn invoke(&self, request: AgentRequest) -> Result<(String, Option<String>)> {
        let mut stream = self.runtime.start(request).await?;
        let mut text = String::new();
        let mut session_id = None;

        while let Some(fragment) = stream.next().await {
            match fragment? {
                ReplyFragment::Text(chunk) => text.push_str(&chunk),
                ReplyFragment::Result { session_id: id } => session_id = Some(id),
            }
        }
        Ok((text, session_id))
    }
}
