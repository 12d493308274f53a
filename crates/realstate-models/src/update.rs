//! Inbound Telegram update payload.
//!
//! Only the fields the webhook acts on are modelled. Unknown fields are
//! ignored so newer Bot API payloads still parse.

use serde::{Deserialize, Serialize};

/// A Telegram user (the sender of a message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Numeric Telegram identifier.
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// One size variant of a photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A voice note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    pub file_unique_id: String,
    /// Duration in seconds.
    pub duration: u32,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A generic file attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// An incoming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Sender; absent for channel posts.
    #[serde(rename = "from", default)]
    pub from_user: Option<User>,
    /// Unix timestamp.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub voice: Option<Voice>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Message {
    /// Telegram id of the sender, if known.
    pub fn sender_id(&self) -> Option<i64> {
        self.from_user.as_ref().map(|u| u.id)
    }

    /// Whether the message carries at least one photo size.
    pub fn has_photo(&self) -> bool {
        self.photo.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// A webhook update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 42, "is_bot": false, "first_name": "Ana"},
                "chat": {"id": 42, "type": "private"},
                "date": 1_700_000_000,
                "text": "Hola"
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.sender_id(), Some(42));
        assert_eq!(message.text.as_deref(), Some("Hola"));
        assert!(!message.has_photo());
    }

    #[test]
    fn test_parse_update_without_message() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 11,
            "edited_message": {"message_id": 1}
        }))
        .unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_parse_document_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 12,
            "message": {
                "message_id": 6,
                "from": {"id": 7, "first_name": "Luis"},
                "date": 1_700_000_000,
                "document": {
                    "file_id": "doc-1",
                    "file_unique_id": "u-1",
                    "file_name": "contrato.pdf",
                    "mime_type": "application/pdf"
                }
            }
        }))
        .unwrap();

        let document = update.message.unwrap().document.unwrap();
        assert_eq!(document.file_name.as_deref(), Some("contrato.pdf"));
    }

    #[test]
    fn test_reject_missing_update_id() {
        let result: Result<Update, _> = serde_json::from_value(json!({"message": null}));
        assert!(result.is_err());
    }
}
