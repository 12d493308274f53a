//! Conversational agent facade.
//!
//! Turns one user message plus the caller's organization into one reply from
//! a delegated agent process that has tool access to the application
//! database. Conversations are resumed per Telegram user while they stay on
//! the same calendar day and organization.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use realstate_agent::{
//!     ClaudeCliRuntime, InMemorySessionStore, OrgContext, PropertyAgent, SystemClock,
//! };
//!
//! # async fn run(settings: &realstate_core::Settings) {
//! let agent = PropertyAgent::new(
//!     Arc::new(ClaudeCliRuntime::from_settings(settings)),
//!     Arc::new(InMemorySessionStore::new()),
//!     Arc::new(SystemClock),
//! );
//!
//! let context = OrgContext::new("org-1", "Arriendos Sur", "Ana");
//! let reply = agent.process_message(42, "¿Qué vouchers vencen hoy?", &context).await;
//! println!("{}", reply);
//! # }
//! ```

pub mod agent;
pub mod claude_cli;
pub mod clock;
pub mod error;
pub mod runtime;
pub mod session_store;

pub use agent::{OrgContext, PropertyAgent};
pub use claude_cli::{ClaudeCliRuntime, McpServer};
pub use clock::{Clock, SystemClock};
pub use error::{AgentError, Result};
pub use runtime::{AgentRequest, AgentRuntime, ReplyFragment, ReplyStream};
pub use session_store::{is_session_valid, InMemorySessionStore, SessionStore};
