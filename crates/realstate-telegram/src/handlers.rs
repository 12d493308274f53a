//! Webhook update handling.

use std::sync::Arc;

use realstate_agent::{OrgContext, PropertyAgent};
use realstate_core::prompts::{
    no_more_orgs_message, select_org_message, switched_org_message, welcome_message,
    DEFAULT_ORG_LABEL, DEFAULT_ORG_NAME, DEFAULT_USER_NAME, HELP_MESSAGE,
    INVALID_SELECTION_MESSAGE, LINK_UNAVAILABLE_MESSAGE, NON_NUMERIC_SELECTION_MESSAGE,
    UNKNOWN_COMMAND_MESSAGE, UNLINKED_USER_MESSAGE, UNREADABLE_CONTENT_MESSAGE,
};
use realstate_core::{escape_markdown_v2, Transcriber};
use realstate_models::{LinkedUser, OrganizationChoice, Update};
use realstate_persistence::UserDirectory;
use serde::Serialize;
use teloxide::types::ParseMode;
use tracing::{debug, error, info, warn};

use crate::commands::Command;
use crate::content::extract_content;
use crate::gateway::{Delivery, TelegramGateway};
use crate::state::{pick_choice, SelectionError, SelectionStore};

/// JSON body returned to Telegram for every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn invalid() -> Self {
        Self {
            ok: false,
            error: Some("Invalid update".to_string()),
        }
    }
}

/// Routes one inbound update to a command, the organization menu or the
/// agent, and replies through the gateway.
///
/// Never fails: downstream errors are logged and turned into user-facing
/// replies or a silent acknowledgment.
pub struct WebhookHandler {
    gateway: Arc<dyn TelegramGateway>,
    transcriber: Arc<dyn Transcriber>,
    directory: Arc<dyn UserDirectory>,
    agent: Arc<PropertyAgent>,
    selections: Arc<dyn SelectionStore>,
}

impl WebhookHandler {
    pub fn new(
        gateway: Arc<dyn TelegramGateway>,
        transcriber: Arc<dyn Transcriber>,
        directory: Arc<dyn UserDirectory>,
        agent: Arc<PropertyAgent>,
        selections: Arc<dyn SelectionStore>,
    ) -> Self {
        Self {
            gateway,
            transcriber,
            directory,
            agent,
            selections,
        }
    }

    /// Parse a raw webhook body and handle it.
    pub async fn handle_payload(&self, body: &[u8]) -> WebhookAck {
        match serde_json::from_slice::<Update>(body) {
            Ok(update) => self.handle_update(update).await,
            Err(e) => {
                error!(error = %e, "Error validating update");
                WebhookAck::invalid()
            }
        }
    }

    pub async fn handle_update(&self, update: Update) -> WebhookAck {
        let Some(message) = update.message else {
            debug!(update_id = update.update_id, "Update without message ignored");
            return WebhookAck::ok();
        };
        let Some(telegram_id) = message.sender_id() else {
            debug!(update_id = update.update_id, "Message without sender ignored");
            return WebhookAck::ok();
        };
        // Private chats share the sender's id.
        let chat_id = telegram_id;

        let Some(content) =
            extract_content(&message, self.gateway.as_ref(), self.transcriber.as_ref()).await
        else {
            self.reply(chat_id, UNREADABLE_CONTENT_MESSAGE).await;
            return WebhookAck::ok();
        };

        if content.starts_with('/') {
            self.handle_command(chat_id, telegram_id, &content).await;
            return WebhookAck::ok();
        }

        if let Some(choices) = self.selections.get(telegram_id).await {
            self.handle_org_selection(chat_id, telegram_id, &content, &choices)
                .await;
            return WebhookAck::ok();
        }

        let Some(user) = self.linked_user(telegram_id).await else {
            self.reply(chat_id, UNLINKED_USER_MESSAGE).await;
            return WebhookAck::ok();
        };

        let context = OrgContext::new(
            user.organization_id.clone(),
            user.organization_label(DEFAULT_ORG_NAME),
            user.display_name(DEFAULT_USER_NAME),
        );
        let answer = self
            .agent
            .process_message(telegram_id, &content, &context)
            .await;

        // Agent replies are already formatted for MarkdownV2.
        self.send(chat_id, &answer, Some(message.message_id)).await;
        WebhookAck::ok()
    }

    async fn handle_command(&self, chat_id: i64, telegram_id: i64, text: &str) {
        let command = Command::parse(text);
        info!(telegram_id, command = ?command, "Command received");

        match command {
            Command::Start => match self.linked_user(telegram_id).await {
                Some(user) => {
                    let welcome = welcome_message(
                        user.display_name(DEFAULT_USER_NAME),
                        user.organization_label(DEFAULT_ORG_LABEL),
                    );
                    self.reply(chat_id, &welcome).await;
                }
                None => self.reply(chat_id, UNLINKED_USER_MESSAGE).await,
            },
            Command::Link(_) => self.reply(chat_id, LINK_UNAVAILABLE_MESSAGE).await,
            Command::SwitchOrg => self.start_org_selection(chat_id, telegram_id).await,
            Command::Help => self.reply(chat_id, HELP_MESSAGE).await,
            Command::Unknown(_) => self.reply(chat_id, UNKNOWN_COMMAND_MESSAGE).await,
        }
    }

    async fn start_org_selection(&self, chat_id: i64, telegram_id: i64) {
        let Some(user) = self.linked_user(telegram_id).await else {
            self.reply(chat_id, UNLINKED_USER_MESSAGE).await;
            return;
        };

        let choices = match self.directory.list_organizations(&user.user_id).await {
            Ok(choices) => choices,
            Err(e) => {
                warn!(telegram_id, error = %e, "Failed to list organizations");
                Vec::new()
            }
        };

        if choices.len() <= 1 {
            let text = no_more_orgs_message(user.organization_label(DEFAULT_ORG_LABEL));
            self.reply(chat_id, &text).await;
            return;
        }

        let names: Vec<&str> = choices.iter().map(|c| c.name.as_str()).collect();
        let menu = select_org_message(&names);
        debug!(telegram_id, count = choices.len(), "Awaiting organization selection");
        self.selections.put(telegram_id, choices).await;
        self.reply(chat_id, &menu).await;
    }

    async fn handle_org_selection(
        &self,
        chat_id: i64,
        telegram_id: i64,
        reply: &str,
        choices: &[OrganizationChoice],
    ) {
        let selected = match pick_choice(choices, reply) {
            Ok(selected) => selected,
            Err(SelectionError::OutOfRange) => {
                self.reply(chat_id, INVALID_SELECTION_MESSAGE).await;
                return;
            }
            Err(SelectionError::NotANumber) => {
                self.reply(chat_id, NON_NUMERIC_SELECTION_MESSAGE).await;
                return;
            }
        };

        // A menu is only opened for linked users, but the link can vanish
        // between the menu and the reply.
        let Some(user) = self.linked_user(telegram_id).await else {
            warn!(telegram_id, "Selection pending for an unlinked user");
            self.selections.remove(telegram_id).await;
            self.reply(chat_id, UNLINKED_USER_MESSAGE).await;
            return;
        };

        match self
            .directory
            .update_active_organization(&user.id, &selected.organization_id)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(telegram_id, "Active organization update matched no rows"),
            Err(e) => warn!(telegram_id, error = %e, "Failed to update active organization"),
        }

        self.selections.remove(telegram_id).await;
        self.agent.clear_session(telegram_id).await;
        info!(
            telegram_id,
            organization_id = %selected.organization_id,
            "Organization switched"
        );

        self.reply(chat_id, &switched_org_message(&selected.name)).await;
    }

    /// Linked user for the sender; lookup failures count as "not linked".
    async fn linked_user(&self, telegram_id: i64) -> Option<LinkedUser> {
        match self.directory.find_by_telegram_id(telegram_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(telegram_id, error = %e, "Failed to resolve linked user");
                None
            }
        }
    }

    /// Send bot-authored text, escaped for MarkdownV2.
    async fn reply(&self, chat_id: i64, text: &str) {
        self.send(chat_id, &escape_markdown_v2(text), None).await;
    }

    async fn send(&self, chat_id: i64, text: &str, reply_to: Option<i64>) {
        match self
            .gateway
            .send_message(chat_id, text, reply_to, Some(ParseMode::MarkdownV2))
            .await
        {
            Ok(Delivery::Sent { message_id }) => {
                debug!(chat_id, message_id, "Message sent");
            }
            Ok(Delivery::Rejected { description }) => {
                warn!(chat_id, %description, "Telegram rejected message");
            }
            Err(e) => {
                error!(chat_id, error = %e, "Failed to send message");
            }
        }
    }
}
