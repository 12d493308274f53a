//! Pending organization selections.

use std::collections::HashMap;

use async_trait::async_trait;
use realstate_models::OrganizationChoice;
use tokio::sync::RwLock;

/// Organization menus awaiting a numeric reply, keyed by Telegram user id.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn get(&self, telegram_id: i64) -> Option<Vec<OrganizationChoice>>;

    /// Open (or replace) a selection with the choices in menu order.
    async fn put(&self, telegram_id: i64, choices: Vec<OrganizationChoice>);

    async fn remove(&self, telegram_id: i64) -> Option<Vec<OrganizationChoice>>;
}

/// Process-local selection store; lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySelectionStore {
    pending: RwLock<HashMap<i64, Vec<OrganizationChoice>>>,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SelectionStore for InMemorySelectionStore {
    async fn get(&self, telegram_id: i64) -> Option<Vec<OrganizationChoice>> {
        self.pending.read().await.get(&telegram_id).cloned()
    }

    async fn put(&self, telegram_id: i64, choices: Vec<OrganizationChoice>) {
        self.pending.write().await.insert(telegram_id, choices);
    }

    async fn remove(&self, telegram_id: i64) -> Option<Vec<OrganizationChoice>> {
        self.pending.write().await.remove(&telegram_id)
    }
}

/// Resolve a 1-based menu reply against the pending choices.
pub fn pick_choice<'a>(
    choices: &'a [OrganizationChoice],
    reply: &str,
) -> Result<&'a OrganizationChoice, SelectionError> {
    let number: i64 = reply
        .trim()
        .parse()
        .map_err(|_| SelectionError::NotANumber)?;
    usize::try_from(number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i))
        .ok_or(SelectionError::OutOfRange)
}

/// Why a selection reply was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    NotANumber,
    OutOfRange,
}
