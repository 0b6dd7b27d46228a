// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram webhook payload mapping.
//!
//! Deserializes just the slice of the Bot API `Update` object the relay
//! cares about and converts it into an [`InboundMessage`]. The mapping
//! mirrors the long-polling handler: text, photo (largest rendition),
//! document, and voice are recognized; everything else is `Unsupported`;
//! non-private chats are ignored.

use chrono::DateTime;
use murmur_core::types::{AttachmentKind, InboundMessage, MessageContent};
use serde::Deserialize;

/// The subset of a Telegram `Update` the webhook intake reads.
#[derive(Debug, Deserialize)]
pub struct WebhookUpdate {
    pub message: Option<WebhookMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub message_id: i64,
    pub date: i64,
    pub chat: WebhookChat,
    pub from: Option<WebhookSender>,
    pub text: Option<String>,
    pub photo: Option<Vec<WebhookFile>>,
    pub document: Option<WebhookFile>,
    pub voice: Option<WebhookFile>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookSender {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookFile {
    pub file_id: String,
}

impl WebhookUpdate {
    /// Maps the update to an [`InboundMessage`], or `None` when it carries
    /// no message or the chat is not private.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let msg = self.message?;
        if msg.chat.kind != "private" {
            return None;
        }

        let content = extract_content(&msg);
        let (sender_id, first_name, last_name) = match msg.from {
            Some(sender) => (sender.id, sender.first_name, sender.last_name),
            None => (msg.chat.id, String::new(), None),
        };

        let timestamp = DateTime::from_timestamp(msg.date, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        Some(InboundMessage {
            id: msg.message_id.to_string(),
            chat_id: msg.chat.id,
            sender_id,
            first_name,
            last_name,
            content,
            timestamp,
        })
    }
}

fn extract_content(msg: &WebhookMessage) -> MessageContent {
    if let Some(text) = &msg.text {
        return MessageContent::Text(text.clone());
    }

    if let Some(photos) = &msg.photo {
        // Renditions are ordered smallest to largest.
        if let Some(largest) = photos.last() {
            return MessageContent::Attachment {
                kind: AttachmentKind::Photo,
                file_id: largest.file_id.clone(),
            };
        }
    }

    if let Some(doc) = &msg.document {
        return MessageContent::Attachment {
            kind: AttachmentKind::Document,
            file_id: doc.file_id.clone(),
        };
    }

    if let Some(voice) = &msg.voice {
        return MessageContent::Attachment {
            kind: AttachmentKind::Voice,
            file_id: voice.file_id.clone(),
        };
    }

    MessageContent::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> WebhookUpdate {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn text_update_maps_to_inbound() {
        let update = parse(serde_json::json!({
            "update_id": 100,
            "message": {
                "message_id": 7,
                "date": 1700000000i64,
                "chat": {"id": 55, "type": "private"},
                "from": {"id": 55, "is_bot": false, "first_name": "Ada", "last_name": "Lovelace"},
                "text": "hello"
            }
        }));

        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.id, "7");
        assert_eq!(inbound.chat_id, 55);
        assert_eq!(inbound.sender_id, 55);
        assert_eq!(inbound.first_name, "Ada");
        assert_eq!(inbound.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(inbound.content, MessageContent::Text("hello".to_string()));
        assert!(inbound.timestamp.starts_with("2023-11-14T"));
    }

    #[test]
    fn group_chat_is_ignored() {
        let update = parse(serde_json::json!({
            "update_id": 100,
            "message": {
                "message_id": 7,
                "date": 1700000000i64,
                "chat": {"id": -99, "type": "supergroup"},
                "from": {"id": 55, "is_bot": false, "first_name": "Ada"},
                "text": "hello"
            }
        }));
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn update_without_message_is_ignored() {
        let update = parse(serde_json::json!({"update_id": 100}));
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn photo_update_picks_largest_rendition() {
        let update = parse(serde_json::json!({
            "update_id": 101,
            "message": {
                "message_id": 8,
                "date": 1700000000i64,
                "chat": {"id": 55, "type": "private"},
                "from": {"id": 55, "is_bot": false, "first_name": "Ada"},
                "photo": [
                    {"file_id": "small", "width": 90, "height": 90},
                    {"file_id": "large", "width": 800, "height": 800}
                ]
            }
        }));

        let inbound = update.into_inbound().unwrap();
        assert_eq!(
            inbound.content,
            MessageContent::Attachment {
                kind: AttachmentKind::Photo,
                file_id: "large".to_string(),
            }
        );
    }

    #[test]
    fn sticker_update_is_unsupported_content() {
        let update = parse(serde_json::json!({
            "update_id": 102,
            "message": {
                "message_id": 9,
                "date": 1700000000i64,
                "chat": {"id": 55, "type": "private"},
                "from": {"id": 55, "is_bot": false, "first_name": "Ada"},
                "sticker": {"file_id": "s-1"}
            }
        }));
        assert_eq!(
            update.into_inbound().unwrap().content,
            MessageContent::Unsupported
        );
    }
}
