//! Outbound Telegram Bot API calls.

use std::path::Path;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, ReplyParameters};
use teloxide::RequestError;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Result, TelegramError};

/// Outcome of a send that reached Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { message_id: i32 },
    /// Telegram refused the message (bad markup, blocked bot, ...).
    Rejected { description: String },
}

/// A downloaded file in the temp directory, removed when dropped.
#[derive(Debug)]
pub struct DownloadedFile {
    path: TempPath,
}

impl DownloadedFile {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The Bot API surface the webhook handler needs.
#[async_trait]
pub trait TelegramGateway: Send + Sync {
    /// Send `text` to `chat_id`, optionally as a reply and with a markup mode.
    ///
    /// Telegram-side refusals come back as [`Delivery::Rejected`]; only
    /// transport failures are errors. Nothing is retried.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        parse_mode: Option<ParseMode>,
    ) -> Result<Delivery>;

    /// Fetch a file by id into a uniquely named temp file keeping its
    /// extension. `None` when resolution or download fails.
    async fn download_file(&self, file_id: &str) -> Option<DownloadedFile>;

    async fn set_webhook(&self, url: &str) -> bool;

    async fn delete_webhook(&self) -> bool;
}

/// [`TelegramGateway`] over a teloxide [`Bot`].
#[derive(Clone)]
pub struct TeloxideGateway {
    bot: Bot,
}

impl TeloxideGateway {
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_bot(Bot::new(token))
    }

    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn fetch(&self, file_id: &str) -> Result<DownloadedFile> {
        let file = self.bot.get_file(file_id.to_string()).await?;
        let suffix = temp_suffix(&file.path);

        let named = tempfile::Builder::new()
            .prefix("realstate-")
            .suffix(&suffix)
            .tempfile()?;
        let (std_file, path) = named.into_parts();
        let mut dst = tokio::fs::File::from_std(std_file);

        self.bot.download_file(&file.path, &mut dst).await?;
        dst.flush().await?;

        debug!(file_id, path = %path.display(), "File downloaded");
        Ok(DownloadedFile::new(path))
    }
}

/// Extension of the remote path including the dot, or `.tmp`.
fn temp_suffix(remote_path: &str) -> String {
    Path::new(remote_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| ".tmp".to_string())
}

#[async_trait]
impl TelegramGateway for TeloxideGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        parse_mode: Option<ParseMode>,
    ) -> Result<Delivery> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if let Some(mode) = parse_mode {
            req = req.parse_mode(mode);
        }
        if let Some(id) = reply_to.and_then(|id| i32::try_from(id).ok()) {
            req = req.reply_parameters(ReplyParameters::new(MessageId(id)));
        }

        match req.await {
            Ok(sent) => Ok(Delivery::Sent {
                message_id: sent.id.0,
            }),
            Err(RequestError::Api(e)) => Ok(Delivery::Rejected {
                description: e.to_string(),
            }),
            Err(e) => Err(TelegramError::Request(e)),
        }
    }

    async fn download_file(&self, file_id: &str) -> Option<DownloadedFile> {
        match self.fetch(file_id).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(file_id, error = %e, "Failed to download file");
                None
            }
        }
    }

    async fn set_webhook(&self, url: &str) -> bool {
        let parsed = match url::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(source) => {
                let e = TelegramError::InvalidWebhookUrl {
                    url: url.to_string(),
                    source,
                };
                warn!(error = %e, "Refusing to register webhook");
                return false;
            }
        };
        match self.bot.set_webhook(parsed).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "setWebhook failed");
                false
            }
        }
    }

    async fn delete_webhook(&self) -> bool {
        match self.bot.delete_webhook().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "deleteWebhook failed");
                false
            }
        }
    }
}
