//! Message content extraction.
//!
//! A message may carry several kinds of content at once; the first kind
//! that yields text wins, in this order: text, voice, document, photo.

use realstate_core::prompts::document_placeholder;
use realstate_core::Transcriber;
use realstate_models::{Document, Message, Voice};
use tracing::{debug, warn};

use crate::gateway::TelegramGateway;

/// One kind of content found on a message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageContent<'a> {
    Text(&'a str),
    Voice(&'a Voice),
    Document {
        document: &'a Document,
        caption: Option<&'a str>,
    },
    PhotoCaption(&'a str),
}

impl<'a> MessageContent<'a> {
    /// Content kinds present on `message`, in precedence order.
    pub fn candidates(message: &'a Message) -> Vec<MessageContent<'a>> {
        let caption = message.caption.as_deref().filter(|c| !c.is_empty());
        let mut found = Vec::new();

        if let Some(text) = message.text.as_deref().filter(|t| !t.is_empty()) {
            found.push(MessageContent::Text(text));
        }
        if let Some(voice) = &message.voice {
            found.push(MessageContent::Voice(voice));
        }
        if let Some(document) = &message.document {
            found.push(MessageContent::Document { document, caption });
        }
        if message.has_photo() {
            if let Some(caption) = caption {
                found.push(MessageContent::PhotoCaption(caption));
            }
        }
        found
    }

    /// Turn this content into text. Only voice can fail.
    pub async fn extract(
        self,
        gateway: &dyn TelegramGateway,
        transcriber: &dyn Transcriber,
    ) -> Option<String> {
        match self {
            MessageContent::Text(text) => Some(text.to_string()),
            MessageContent::Voice(voice) => transcribe_voice(voice, gateway, transcriber).await,
            MessageContent::Document { document, caption } => Some(match caption {
                Some(caption) => caption.to_string(),
                None => document_placeholder(document.file_name.as_deref()),
            }),
            MessageContent::PhotoCaption(caption) => Some(caption.to_string()),
        }
    }
}

async fn transcribe_voice(
    voice: &Voice,
    gateway: &dyn TelegramGateway,
    transcriber: &dyn Transcriber,
) -> Option<String> {
    let Some(audio) = gateway.download_file(&voice.file_id).await else {
        warn!(file_id = %voice.file_id, "Voice note could not be downloaded");
        return None;
    };
    // `audio` is removed when it goes out of scope, whatever the outcome.
    let text = transcriber.transcribe(audio.path()).await;
    debug!(
        file_id = %voice.file_id,
        transcribed = text.is_some(),
        "Voice note processed"
    );
    text
}

/// Text content of `message`, trying each content kind in order.
pub async fn extract_content(
    message: &Message,
    gateway: &dyn TelegramGateway,
    transcriber: &dyn Transcriber,
) -> Option<String> {
    for candidate in MessageContent::candidates(message) {
        if let Some(text) = candidate.extract(gateway, transcriber).await {
            return Some(text);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use realstate_models::{PhotoSize, User};

    fn message() -> Message {
        Message {
            message_id: 1,
            from_user: Some(User {
                id: 7,
                is_bot: false,
                first_name: "Ana".to_string(),
                last_name: None,
                username: None,
            }),
            date: 0,
            text: None,
            photo: None,
            voice: None,
            document: None,
            caption: None,
        }
    }

    fn voice() -> Voice {
        Voice {
            file_id: "v1".to_string(),
            file_unique_id: "u1".to_string(),
            duration: 3,
            mime_type: Some("audio/ogg".to_string()),
            file_size: None,
        }
    }

    fn document(name: Option<&str>) -> Document {
        Document {
            file_id: "d1".to_string(),
            file_unique_id: "u2".to_string(),
            file_name: name.map(str::to_string),
            mime_type: None,
            file_size: None,
        }
    }

    #[test]
    fn test_candidates_order() {
        let mut msg = message();
        msg.text = Some("Hola".to_string());
        msg.voice = Some(voice());
        msg.document = Some(document(Some("contrato.pdf")));

        let kinds = MessageContent::candidates(&msg);
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], MessageContent::Text("Hola"));
        assert!(matches!(kinds[1], MessageContent::Voice(_)));
        assert!(matches!(kinds[2], MessageContent::Document { caption: None, .. }));
    }

    #[test]
    fn test_photo_needs_caption() {
        let mut msg = message();
        msg.photo = Some(vec![PhotoSize {
            file_id: "p1".to_string(),
            file_unique_id: "u3".to_string(),
            width: 90,
            height: 90,
            file_size: None,
        }]);
        assert!(MessageContent::candidates(&msg).is_empty());

        msg.caption = Some("fachada".to_string());
        assert_eq!(
            MessageContent::candidates(&msg),
            vec![MessageContent::PhotoCaption("fachada")]
        );
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut msg = message();
        msg.text = Some(String::new());
        assert!(MessageContent::candidates(&msg).is_empty());
    }
}
