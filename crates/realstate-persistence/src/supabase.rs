//! Supabase (PostgREST) implementation of [`UserDirectory`].
//!
//! The linked user is resolved with three sequential single-table selects
//! joined here rather than with an embedded resource. Row-level security on
//! `users` and `organizaciones` rejects embedded joins from `telegram_users`,
//! so each table is read on its own.

use async_trait::async_trait;
use realstate_models::{LinkedUser, OrganizationChoice};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::directory::UserDirectory;
use crate::error::{DirectoryError, Result};

const TELEGRAM_USERS: &str = "telegram_users";
const USERS: &str = "users";
const ORGANIZATIONS: &str = "organizaciones";
const MEMBERSHIPS: &str = "user_organizacion";

/// Name used when the user row has neither first nor last name.
const FALLBACK_USER_NAME: &str = "Usuario";

/// Name used for a membership whose organization row has no name.
const FALLBACK_ORG_NAME: &str = "Sin nombre";

#[derive(Debug, Deserialize)]
struct TelegramUserRow {
    id: String,
    telegram_id: i64,
    user_id: String,
    organizacion_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct UserRow {
    nombre: Option<String>,
    apellido: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OrganizationRow {
    nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipRow {
    organizacion_id: String,
}

#[derive(Debug, Serialize)]
struct NewTelegramUser<'a> {
    telegram_id: i64,
    user_id: &'a str,
    organizacion_id: &'a str,
}

/// Join first and last name, falling back to a generic label.
fn compose_user_name(nombre: Option<&str>, apellido: Option<&str>) -> String {
    let full = format!("{} {}", nombre.unwrap_or(""), apellido.unwrap_or(""));
    let full = full.trim();
    if full.is_empty() {
        FALLBACK_USER_NAME.to_string()
    } else {
        full.to_string()
    }
}

/// PostgREST client scoped to the bot's tables.
#[derive(Clone)]
pub struct SupabaseDirectory {
    client: reqwest::Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseDirectory {
    /// Create a client for the project at `base_url` using the service-role key.
    pub fn new(base_url: impl AsRef<str>, service_role_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            rest_url: format!("{}/rest/v1", base_url.as_ref().trim_end_matches('/')),
            api_key: service_role_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn decode_rows<T: DeserializeOwned>(
        table: &'static str,
        response: reqwest::Response,
    ) -> Result<Vec<T>> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                table,
                status: status.as_u16(),
                body,
            });
        }
        trace!(table, body = %body, "Rows received");
        serde_json::from_str(&body).map_err(|source| DirectoryError::Decode { table, source })
    }

    /// `select <columns> from <table> where <column> = <value>`.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        columns: &str,
        column: &str,
        value: &str,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut query = vec![
            ("select".to_string(), columns.to_string()),
            (column.to_string(), format!("eq.{}", value)),
        ];
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query)
            .send()
            .await?;
        Self::decode_rows(table, response).await
    }

    /// Single-row variant of [`select`](Self::select); absent rows yield `None`.
    async fn maybe_single<T: DeserializeOwned>(
        &self,
        table: &'static str,
        columns: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<T>> {
        let rows = self.select(table, columns, column, value, Some(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn organization_name(&self, organization_id: &str) -> Result<Option<String>> {
        let row: Option<OrganizationRow> = self
            .maybe_single(ORGANIZATIONS, "nombre", "organizacion_id", organization_id)
            .await?;
        Ok(row.and_then(|r| r.nombre))
    }
}

#[async_trait]
impl UserDirectory for SupabaseDirectory {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<LinkedUser>> {
        let Some(link) = self
            .maybe_single::<TelegramUserRow>(
                TELEGRAM_USERS,
                "id,telegram_id,user_id,organizacion_id",
                "telegram_id",
                &telegram_id.to_string(),
            )
            .await?
        else {
            debug!(telegram_id, "No linked user");
            return Ok(None);
        };

        let user: UserRow = self
            .maybe_single(USERS, "nombre,apellido", "user_id", &link.user_id)
            .await?
            .unwrap_or_default();

        let organization_name = self.organization_name(&link.organizacion_id).await?;

        Ok(Some(LinkedUser {
            id: link.id,
            telegram_id: link.telegram_id,
            user_id: link.user_id,
            organization_id: link.organizacion_id,
            organization_name,
            user_name: Some(compose_user_name(
                user.nombre.as_deref(),
                user.apellido.as_deref(),
            )),
        }))
    }

    async fn list_organizations(&self, user_id: &str) -> Result<Vec<OrganizationChoice>> {
        let memberships: Vec<MembershipRow> = self
            .select(MEMBERSHIPS, "organizacion_id", "user_id", user_id, None)
            .await?;

        let mut organizations = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let name = self
                .organization_name(&membership.organizacion_id)
                .await?
                .unwrap_or_else(|| FALLBACK_ORG_NAME.to_string());
            organizations.push(OrganizationChoice::new(membership.organizacion_id, name));
        }
        Ok(organizations)
    }

    async fn update_active_organization(
        &self,
        linked_user_id: &str,
        organization_id: &str,
    ) -> Result<bool> {
        let response = self
            .authorized(self.client.patch(self.table_url(TELEGRAM_USERS)))
            .query(&[("id", format!("eq.{}", linked_user_id))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "organizacion_id": organization_id }))
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = Self::decode_rows(TELEGRAM_USERS, response).await?;
        debug!(
            linked_user_id,
            organization_id,
            updated = rows.len(),
            "Active organization updated"
        );
        Ok(!rows.is_empty())
    }

    async fn create_linked_user(
        &self,
        telegram_id: i64,
        user_id: &str,
        organization_id: &str,
    ) -> Result<LinkedUser> {
        let response = self
            .authorized(self.client.post(self.table_url(TELEGRAM_USERS)))
            .header("Prefer", "return=representation")
            .json(&NewTelegramUser {
                telegram_id,
                user_id,
                organizacion_id: organization_id,
            })
            .send()
            .await?;

        let row = Self::decode_rows::<TelegramUserRow>(TELEGRAM_USERS, response)
            .await?
            .into_iter()
            .next()
            .ok_or(DirectoryError::Empty(TELEGRAM_USERS))?;

        Ok(LinkedUser {
            id: row.id,
            telegram_id: row.telegram_id,
            user_id: row.user_id,
            organization_id: row.organizacion_id,
            organization_name: None,
            user_name: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serve canned PostgREST responses keyed by table and `eq.` filter.
    async fn table(
        Path(table): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        let filter = |col: &str| params.get(col).cloned().unwrap_or_default();
        let rows = match table.as_str() {
            "telegram_users" if filter("telegram_id") == "eq.42" => json!([{
                "id": "tu-1", "telegram_id": 42, "user_id": "u-1", "organizacion_id": "org-1"
            }]),
            "telegram_users" => json!([]),
            "users" if filter("user_id") == "eq.u-1" => {
                json!([{"nombre": "Ana", "apellido": "Soto"}])
            }
            "organizaciones" if filter("organizacion_id") == "eq.org-1" => {
                json!([{"nombre": "Arriendos Sur"}])
            }
            "organizaciones" if filter("organizacion_id") == "eq.org-2" => {
                json!([{"nombre": null}])
            }
            "organizaciones" => json!([]),
            "user_organizacion" => {
                json!([{"organizacion_id": "org-1"}, {"organizacion_id": "org-2"}])
            }
            _ => return (StatusCode::NOT_FOUND, Json(json!({"message": "unknown table"}))),
        };
        (StatusCode::OK, Json(rows))
    }

    async fn spawn_fake_rest() -> String {
        let app = Router::new().route("/rest/v1/:table", get(table));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_compose_user_name() {
        assert_eq!(compose_user_name(Some("Ana"), Some("Soto")), "Ana Soto");
        assert_eq!(compose_user_name(Some("Ana"), None), "Ana");
        assert_eq!(compose_user_name(None, Some(" ")), "Usuario");
    }

    #[tokio::test]
    async fn test_find_by_telegram_id_joins_three_tables() {
        let directory = SupabaseDirectory::new(spawn_fake_rest().await, "key");
        let user = directory.find_by_telegram_id(42).await.unwrap().unwrap();

        assert_eq!(user.id, "tu-1");
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.organization_id, "org-1");
        assert_eq!(user.organization_name.as_deref(), Some("Arriendos Sur"));
        assert_eq!(user.user_name.as_deref(), Some("Ana Soto"));
    }

    #[tokio::test]
    async fn test_find_by_telegram_id_not_linked() {
        let directory = SupabaseDirectory::new(spawn_fake_rest().await, "key");
        assert!(directory.find_by_telegram_id(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_organizations_resolves_names_in_order() {
        let directory = SupabaseDirectory::new(spawn_fake_rest().await, "key");
        let orgs = directory.list_organizations("u-1").await.unwrap();
        assert_eq!(
            orgs,
            vec![
                OrganizationChoice::new("org-1", "Arriendos Sur"),
                OrganizationChoice::new("org-2", "Sin nombre"),
            ]
        );
    }

    #[tokio::test]
    async fn test_status_error_is_reported() {
        let base = spawn_fake_rest().await;
        let directory = SupabaseDirectory::new(format!("{}/", base), "key");
        let err = directory
            .select::<Value>("propiedades", "*", "id", "1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Status { status: 404, .. }));
    }
}
