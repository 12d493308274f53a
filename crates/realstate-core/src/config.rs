//! Process configuration.
//!
//! Settings are read from environment variables (after loading an optional
//! `.env` file) into an immutable [`Settings`] value. [`load`] caches it in
//! a process-wide singleton.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`
//! - `SUPABASE_PROJECT_REF`, `SUPABASE_ACCESS_TOKEN` (agent tool server)
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` (lookup client)
//! - `GROQ_API_KEY`
//!
//! Optional:
//! - `WEBHOOK_URL`: public base URL; the webhook is registered at `{WEBHOOK_URL}/webhook`
//! - `HOST` (default `0.0.0.0`), `PORT` (default `8000`)
//! - `AGENT_MODEL` (default `sonnet`), `AGENT_COMMAND` (default `claude`)

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default model alias passed to the agent runtime.
pub const DEFAULT_AGENT_MODEL: &str = "sonnet";

/// Default agent executable.
pub const DEFAULT_AGENT_COMMAND: &str = "claude";

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Immutable application settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub telegram_bot_token: String,
    pub supabase_project_ref: String,
    pub supabase_access_token: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub groq_api_key: String,
    pub webhook_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub agent_model: String,
    pub agent_command: String,
}

impl Settings {
    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            supabase_project_ref: required("SUPABASE_PROJECT_REF")?,
            supabase_access_token: required("SUPABASE_ACCESS_TOKEN")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            groq_api_key: required("GROQ_API_KEY")?,
            webhook_url: optional("WEBHOOK_URL"),
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            agent_model: optional("AGENT_MODEL").unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
            agent_command: optional("AGENT_COMMAND")
                .unwrap_or_else(|| DEFAULT_AGENT_COMMAND.to_string()),
        })
    }

    /// Build settings from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to load .env file");
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full webhook URL to register with Telegram, if a public base is configured.
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook_url
            .as_ref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("Settings")
            .field("telegram_bot_token", &REDACTED)
            .field("supabase_project_ref", &self.supabase_project_ref)
            .field("supabase_access_token", &REDACTED)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_service_role_key", &REDACTED)
            .field("groq_api_key", &REDACTED)
            .field("webhook_url", &self.webhook_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("agent_model", &self.agent_model)
            .field("agent_command", &self.agent_command)
            .finish()
    }
}

/// Load the process-wide settings, reading the environment on first call.
///
/// # Errors
/// Returns an error if a required variable is missing or invalid. Nothing is
/// cached in that case.
pub fn load() -> Result<&'static Settings, ConfigError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }
    let settings = Settings::from_env()?;
    Ok(SETTINGS.get_or_init(|| settings))
}
