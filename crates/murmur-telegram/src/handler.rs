// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content extraction from Telegram messages.
//!
//! Maps each incoming Telegram message into a channel-agnostic
//! [`InboundMessage`]. Nothing is dropped here: attachment types the relay
//! cannot process become [`MessageContent::Attachment`] records, everything
//! else becomes [`MessageContent::Unsupported`] so the pipeline can answer
//! with its fixed notice.

use murmur_core::types::{AttachmentKind, InboundMessage, MessageContent};
use teloxide::prelude::*;
use teloxide::types::ChatKind;

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Extracts content from a Telegram message.
///
/// Text maps to [`MessageContent::Text`]; photos (largest rendition),
/// documents, and voice notes map to attachments carrying Telegram's file
/// id; anything else (stickers, locations, polls) is `Unsupported`.
pub fn extract_content(msg: &Message) -> MessageContent {
    if let Some(text) = msg.text() {
        return MessageContent::Text(text.to_string());
    }

    if let Some(photos) = msg.photo() {
        // Renditions are ordered smallest to largest.
        if let Some(largest) = photos.last() {
            return MessageContent::Attachment {
                kind: AttachmentKind::Photo,
                file_id: largest.file.id.to_string(),
            };
        }
    }

    if let Some(doc) = msg.document() {
        return MessageContent::Attachment {
            kind: AttachmentKind::Document,
            file_id: doc.file.id.to_string(),
        };
    }

    if let Some(voice) = msg.voice() {
        return MessageContent::Attachment {
            kind: AttachmentKind::Voice,
            file_id: voice.file.id.to_string(),
        };
    }

    MessageContent::Unsupported
}

/// Converts a Telegram message and extracted content into an
/// [`InboundMessage`].
///
/// A missing sender (channel posts) falls back to the chat id, so the
/// conversation log still has a stable key.
pub fn to_inbound_message(msg: &Message, content: MessageContent) -> InboundMessage {
    let (sender_id, first_name, last_name) = match msg.from.as_ref() {
        Some(user) => (
            user.id.0 as i64,
            user.first_name.clone(),
            user.last_name.clone(),
        ),
        None => (msg.chat.id.0, String::new(), None),
    };

    InboundMessage {
        id: msg.id.0.to_string(),
        chat_id: msg.chat.id.0,
        sender_id,
        first_name,
        last_name,
        content,
        timestamp: msg.date.to_rfc3339(),
    }
}
