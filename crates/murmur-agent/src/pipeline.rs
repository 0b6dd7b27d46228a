// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message relay pipeline.
//!
//! One pass per inbound event: resolve the sender, branch on content,
//! assemble context, generate, record, deliver. Each pass runs as a
//! detached task with its own error boundary; a failing pass answers with
//! a retry notice and is never re-driven.

use std::sync::Arc;

use murmur_core::types::{
    ContextTurn, InboundMessage, MessageContent, OutboundMessage, Role, TurnRole,
};
use murmur_core::{ChannelAdapter, MurmurError};
use murmur_storage::StoreGateway;
use tracing::{debug, error};

use crate::context::assemble_context;
use crate::responder::Responder;

/// Reply to the `/start` command.
pub const WELCOME_MESSAGE: &str =
    "Hi! I'm ready to chat. Send me a message to get started.";

/// Reply to photos, documents, and voice notes.
pub const ATTACHMENT_NOTICE: &str =
    "I can't process files, photos, or voice messages yet. Please send text.";

/// Reply to stickers, locations, and other unhandled content.
pub const UNSUPPORTED_NOTICE: &str = "I can only handle text messages for now.";

/// Reply when the pass itself fails unexpectedly.
pub const RETRY_NOTICE: &str = "Something unexpected happened. Please try again.";

/// One relay pass per inbound message.
pub struct Pipeline {
    gateway: Arc<StoreGateway>,
    responder: Arc<Responder>,
    channel: Arc<dyn ChannelAdapter>,
    history_window: usize,
}

impl Pipeline {
    pub fn new(
        gateway: Arc<StoreGateway>,
        responder: Arc<Responder>,
        channel: Arc<dyn ChannelAdapter>,
        history_window: usize,
    ) -> Self {
        Self {
            gateway,
            responder,
            channel,
            history_window,
        }
    }

    /// Error boundary for a detached task. A failed pass is logged and
    /// answered with [`RETRY_NOTICE`]; it is never retried.
    pub async fn process(self: Arc<Self>, msg: InboundMessage) {
        if let Err(e) = self.handle(&msg).await {
            error!(tg_id = msg.sender_id, error = %e, "pipeline pass failed");
            if let Err(send_err) = self.deliver(msg.chat_id, RETRY_NOTICE).await {
                error!(chat_id = msg.chat_id, error = %send_err, "retry notice delivery failed");
            }
        }
    }

    async fn handle(&self, msg: &InboundMessage) -> Result<(), MurmurError> {
        let user = self.gateway.get_or_create_user(msg).await;
        debug!(tg_id = user.tg_id, chat_id = msg.chat_id, "processing inbound message");

        match &msg.content {
            MessageContent::Text(text) if text.trim() == "/start" => {
                self.gateway
                    .append_message(user.tg_id, Role::User, text, None)
                    .await;
                self.deliver(msg.chat_id, WELCOME_MESSAGE).await
            }
            MessageContent::Text(text) => {
                // Context covers the turns BEFORE this message; the current
                // text is appended to the request after the history read.
                let mut turns =
                    assemble_context(&self.gateway, user.tg_id, self.history_window).await;
                self.gateway
                    .append_message(user.tg_id, Role::User, text, None)
                    .await;
                turns.push(ContextTurn {
                    role: TurnRole::User,
                    content: text.clone(),
                });

                let reply = self.responder.respond(turns).await;

                // The assistant row is recorded even when the reply is a
                // canned apology, so the log mirrors what the user saw.
                self.gateway
                    .append_message(user.tg_id, Role::Assistant, &reply, None)
                    .await;
                self.deliver(msg.chat_id, &reply).await
            }
            MessageContent::Attachment { kind, file_id } => {
                let metadata = serde_json::json!({
                    "kind": kind.to_string(),
                    "file_id": file_id,
                })
                .to_string();
                self.gateway
                    .append_message(user.tg_id, Role::User, &format!("[{kind}]"), Some(metadata))
                    .await;
                self.deliver(msg.chat_id, ATTACHMENT_NOTICE).await
            }
            MessageContent::Unsupported => self.deliver(msg.chat_id, UNSUPPORTED_NOTICE).await,
        }
    }

    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), MurmurError> {
        self.channel
            .send(OutboundMessage {
                chat_id,
                content: text.to_string(),
            })
            .await?;
        Ok(())
    }
}
