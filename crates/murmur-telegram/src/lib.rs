// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Murmur relay.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide.
//! Inbound messages arrive through long polling; the webhook intake on the
//! admin server feeds the same queue through [`TelegramChannel::inbound_sender`].

pub mod handler;

use async_trait::async_trait;
use murmur_config::model::TelegramConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::{ChannelAdapter, PluginAdapter};
use murmur_core::types::{
    AdapterType, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects via long polling, extracts each message into a channel-agnostic
/// form, and delivers replies with a Markdown-then-plain-text fallback.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, MurmurError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            MurmurError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(MurmurError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// A sender feeding the same inbound queue the poller writes to.
    ///
    /// The admin server's webhook endpoint uses this so both intake paths
    /// converge on one pipeline.
    pub fn inbound_sender(&self) -> mpsc::Sender<InboundMessage> {
        self.inbound_tx.clone()
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        // getMe validates the token without side effects.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        debug!("Telegram channel shutting down");
        // The polling task is aborted when the channel is dropped; the agent
        // loop stops calling receive() before that happens.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), MurmurError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }

                    let content = handler::extract_content(&msg);
                    let inbound = handler::to_inbound_message(&msg, content);
                    if tx.send(inbound).await.is_err() {
                        warn!("inbound queue closed, dropping message");
                    }

                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, MurmurError> {
        let chat_id = Recipient::Id(ChatId(msg.chat_id));

        // Try Markdown first; model output often carries formatting that
        // Telegram rejects, so fall back to plain text.
        let sent = match self
            .bot
            .send_message(chat_id.clone(), &msg.content)
            .parse_mode(ParseMode::Markdown)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!(chat_id = msg.chat_id, error = %e, "Markdown send failed, retrying plain");
                self.bot
                    .send_message(chat_id, &msg.content)
                    .await
                    .map_err(|e| MurmurError::Channel {
                        message: format!("failed to send message: {e}"),
                        source: Some(Box::new(e)),
                    })?
            }
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundMessage, MurmurError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| MurmurError::Channel {
            message: "Telegram inbound queue closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramChannel::new(&config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramChannel::new(&config).is_err());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        let channel = TelegramChannel::new(&config).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[tokio::test]
    async fn webhook_sender_feeds_receive() {
        use murmur_core::types::MessageContent;

        let config = TelegramConfig {
            bot_token: Some("test:token".into()),
        };
        let channel = TelegramChannel::new(&config).unwrap();
        let sender = channel.inbound_sender();

        sender
            .send(InboundMessage {
                id: "1".into(),
                chat_id: 9,
                sender_id: 9,
                first_name: "Ada".into(),
                last_name: None,
                content: MessageContent::Text("hi".into()),
                timestamp: "2026-01-01T00:00:00.000Z".into(),
            })
            .await
            .unwrap();

        let received = channel.receive().await.unwrap();
        assert_eq!(received.sender_id, 9);
        assert_eq!(received.content, MessageContent::Text("hi".into()));
    }
}
