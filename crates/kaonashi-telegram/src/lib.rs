// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat transport for Kaonashi.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling into a bounded queue, force-reply prompts, and attachment
//! downloads.

pub mod handler;
pub mod media;

use async_trait::async_trait;
use kaonashi_config::model::TelegramConfig;
use kaonashi_core::error::KaonashiError;
use kaonashi_core::traits::{ChannelAdapter, PluginAdapter};
use kaonashi_core::types::{Attachment, HealthStatus, InboundMessage, MessageId, OutboundMessage};
use teloxide::prelude::*;
use teloxide::types::ForceReply;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram transport implementing [`ChannelAdapter`].
///
/// Every chat the bot can see is delivered; deciding what to act on is left
/// to the dispatcher.
pub struct TelegramTransport {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramTransport {
    /// Creates a transport authenticated with `token`.
    pub fn new(token: &str, config: &TelegramConfig) -> Result<Self, KaonashiError> {
        if token.trim().is_empty() {
            return Err(KaonashiError::Config(
                "telegram bot token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_buffer.max(1));

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn health_check(&self) -> Result<HealthStatus, KaonashiError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KaonashiError> {
        debug!("Telegram transport shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramTransport {
    async fn connect(&mut self) -> Result<(), KaonashiError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let me = self.bot.get_me().await.map_err(|e| KaonashiError::Channel {
            message: format!("failed to authorize bot: {e}"),
            source: Some(Box::new(e)),
        })?;
        info!(
            account = me.user.username.as_deref().unwrap_or_default(),
            "authorized on account"
        );

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::to_inbound_message(&msg) {
                        Some(inbound) => {
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        info!("started Telegram long polling");
        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, KaonashiError> {
        let chat_id = ChatId(msg.conversation_id.0);
        let mut request = self.bot.send_message(chat_id, msg.content);
        if msg.force_reply {
            request = request.reply_markup(ForceReply::new().selective());
        }

        let sent = request.await.map_err(|e| KaonashiError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundMessage, KaonashiError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| KaonashiError::ChannelClosed("Telegram inbound queue".into()))
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, KaonashiError> {
        media::download_attachment(&self.bot, attachment).await
    }
}
