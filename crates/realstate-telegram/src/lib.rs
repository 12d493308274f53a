//! Telegram webhook front-end for the Real State assistant.
//!
//! Receives Telegram updates over HTTP, turns each message into text (typed,
//! transcribed from a voice note, or taken from a caption), handles a few
//! slash commands, and forwards everything else to the property agent of
//! the sender's active organization.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`: Lookup of linked users
//! - `SUPABASE_PROJECT_REF`, `SUPABASE_ACCESS_TOKEN`: Agent database tools
//! - `GROQ_API_KEY`: Voice note transcription
//!
//! Optional:
//! - `WEBHOOK_URL`: Public base URL; `/webhook` is registered on startup
//! - `HOST`, `PORT`: Bind address (default: 0.0.0.0:8000)
//!
//! # Commands
//!
//! - `/start` - Welcome message for linked users
//! - `/cambiar_org` - Switch the active organization
//! - `/vincular <código>` - Link an account (not available yet)
//! - `/help` - Show available commands

pub mod commands;
pub mod content;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod server;
pub mod state;

pub use commands::Command;
pub use content::{extract_content, MessageContent};
pub use error::{Result, TelegramError};
pub use gateway::{Delivery, DownloadedFile, TelegramGateway, TeloxideGateway};
pub use handlers::{WebhookAck, WebhookHandler};
pub use server::{create_router, register_webhook, serve, AppState};
pub use state::{InMemorySelectionStore, SelectionStore};
