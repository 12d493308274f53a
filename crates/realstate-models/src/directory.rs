//! Records resolved from the application database.

use serde::{Deserialize, Serialize};

/// A Telegram account linked to an application user and their active
/// organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedUser {
    /// Primary key of the linkage row.
    pub id: String,
    pub telegram_id: i64,
    /// Application user id.
    pub user_id: String,
    /// Currently active organization.
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub user_name: Option<String>,
}

impl LinkedUser {
    /// User name to show, defaulting to `fallback`.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.user_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(fallback)
    }

    /// Organization name to show, defaulting to `fallback`.
    pub fn organization_label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.organization_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
    }
}

/// An organization a user can switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationChoice {
    pub organization_id: String,
    pub name: String,
}

impl OrganizationChoice {
    pub fn new(organization_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            name: name.into(),
        }
    }
}
