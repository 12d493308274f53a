//! Per-user agent session storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use realstate_models::AgentSession;
use tokio::sync::RwLock;

/// Storage for agent sessions keyed by Telegram user id.
///
/// Implementations may be process-local or backed by a shared store; the
/// facade only relies on last-write-wins semantics per key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the stored session, valid or not.
    async fn get(&self, telegram_id: i64) -> Option<AgentSession>;

    /// Store a session, replacing any previous one.
    async fn put(&self, telegram_id: i64, session: AgentSession);

    /// Remove the session, returning it if present.
    async fn remove(&self, telegram_id: i64) -> Option<AgentSession>;
}

/// A session may be resumed only on the day it was stored and for the same
/// organization.
pub fn is_session_valid(session: &AgentSession, today: NaiveDate, organization_id: &str) -> bool {
    session.date == today && session.organization_id == organization_id
}

/// Unbounded in-memory store; cleared on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, AgentSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, telegram_id: i64) -> Option<AgentSession> {
        self.sessions.read().await.get(&telegram_id).cloned()
    }

    async fn put(&self, telegram_id: i64, session: AgentSession) {
        self.sessions.write().await.insert(telegram_id, session);
    }

    async fn remove(&self, telegram_id: i64) -> Option<AgentSession> {
        self.sessions.write().await.remove(&telegram_id)
    }
}
