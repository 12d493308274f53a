//! Core data models for the Real State bot.
//!
//! This crate provides the plain data types shared by every other crate:
//! the subset of the Telegram update payload the webhook understands, the
//! linked-user record resolved from the database, and the agent session.

pub mod directory;
pub mod session;
pub mod update;

// Re-export main types
pub use directory::{LinkedUser, OrganizationChoice};
pub use session::AgentSession;
pub use update::{Document, Message, PhotoSize, Update, User, Voice};
