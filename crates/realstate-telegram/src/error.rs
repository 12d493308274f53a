//! Error types for the Telegram front-end.

use thiserror::Error;

/// Errors that can occur in the Telegram front-end.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Required configuration missing or malformed.
    #[error(transparent)]
    Config(#[from] realstate_core::ConfigError),

    /// Bot API request failed before Telegram could answer.
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    /// File content could not be fetched.
    #[error("Telegram download failed: {0}")]
    Download(#[from] teloxide::DownloadError),

    /// Webhook registration or removal was refused.
    #[error("Webhook request failed: {0}")]
    WebhookFailed(String),

    /// Webhook URL is not a valid absolute URL.
    #[error("Invalid webhook URL {url}: {source}")]
    InvalidWebhookUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

#[cfg(test)]
mod tests {
    use super::*;
    use realstate_core::{ConfigError, Settings};

    #[test]
    fn test_missing_setting_converts_to_config_error() {
        let err: TelegramError = Settings::from_lookup(|_| None).unwrap_err().into();
        assert!(matches!(
            err,
            TelegramError::Config(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
        ));
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }
}
