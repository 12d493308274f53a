//! Directory trait.

use async_trait::async_trait;
use realstate_models::{LinkedUser, OrganizationChoice};

use crate::error::Result;

/// Read/write access to linked Telegram accounts and organization memberships.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a Telegram id to its linked user, with user and organization names.
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<LinkedUser>>;

    /// Organizations the application user belongs to, in membership order.
    async fn list_organizations(&self, user_id: &str) -> Result<Vec<OrganizationChoice>>;

    /// Change the active organization of a linkage row.
    ///
    /// Returns `true` if at least one row was updated.
    async fn update_active_organization(
        &self,
        linked_user_id: &str,
        organization_id: &str,
    ) -> Result<bool>;

    /// Link a Telegram account to an application user.
    async fn create_linked_user(
        &self,
        telegram_id: i64,
        user_id: &str,
        organization_id: &str,
    ) -> Result<LinkedUser>;
}
