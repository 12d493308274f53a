//! Real State Core - shared building blocks for the bot crates.
//!
//! - **config**: Environment-sourced settings loaded once per process
//! - **markdown**: Telegram MarkdownV2 escaping
//! - **prompts**: Agent system prompt and user-facing message templates
//! - **transcription**: Speech-to-text for voice notes

pub mod config;
pub mod markdown;
pub mod prompts;
pub mod transcription;

// Re-export commonly used items for convenience
pub use config::{load as load_settings, ConfigError, Settings};
pub use markdown::escape_markdown_v2;
pub use transcription::{GroqTranscriber, Transcriber, TranscriptionError};
