// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation dispatch for the Kaonashi bot.
//!
//! The [`Dispatcher`] is the single consumer of the transport's inbound
//! stream. For each message it:
//! - issues a prompt when the message is a command
//! - runs the matching lookup when the message answers the pending prompt
//! - replaces the credential payload when the message carries a document
//!
//! Each rule is checked independently, so one message can trigger more than
//! one of them. Lookups run inline; the next message waits until the reply
//! for the current one has been sent.

pub mod correlator;
pub mod format;
pub mod shutdown;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kaonashi_config::CredentialStore;
use kaonashi_config::model::KaonashiConfig;
use kaonashi_core::error::KaonashiError;
use kaonashi_core::types::{
    Attachment, ConversationId, InboundMessage, LookupKind, LookupResult, OutboundMessage,
};
use kaonashi_core::{ChannelAdapter, LookupAdapter};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::correlator::{Command, Correlator, PendingPrompt};

/// Routes inbound messages to prompts, lookups, and credential updates.
pub struct Dispatcher {
    transport: Box<dyn ChannelAdapter>,
    breach: Arc<dyn LookupAdapter>,
    malware: Arc<dyn LookupAdapter>,
    credentials: Arc<CredentialStore>,
    correlator: Correlator,
    greet_on_start: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over the given transport and lookup clients.
    ///
    /// Fails when a lookup client is wired to the wrong slot.
    pub fn new(
        transport: Box<dyn ChannelAdapter>,
        breach: Arc<dyn LookupAdapter>,
        malware: Arc<dyn LookupAdapter>,
        credentials: Arc<CredentialStore>,
        config: &KaonashiConfig,
    ) -> Result<Self, KaonashiError> {
        for (client, expected) in [(&breach, LookupKind::Breach), (&malware, LookupKind::Malware)] {
            if client.kind() != expected {
                return Err(KaonashiError::Internal(format!(
                    "{} client registered as the {expected} lookup",
                    client.kind()
                )));
            }
        }

        info!(
            agent_name = config.agent.name.as_str(),
            transport = transport.name(),
            "dispatcher initialized"
        );

        Ok(Self {
            transport,
            breach,
            malware,
            credentials,
            correlator: Correlator::new(Duration::from_secs(config.correlator.prompt_ttl_secs)),
            greet_on_start: config.telegram.greet_on_start,
        })
    }

    /// Connects the transport and processes messages until `cancel` fires or
    /// the transport closes.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), KaonashiError> {
        self.transport.connect().await?;

        if self.greet_on_start {
            self.greet().await;
        }

        info!("dispatcher running");

        loop {
            tokio::select! {
                msg = self.transport.receive() => {
                    match msg {
                        Ok(inbound) => self.handle_inbound(inbound).await,
                        Err(e) if e.is_channel_closed() => {
                            warn!(error = %e, "transport closed, stopping dispatcher");
                            break;
                        }
                        Err(e) => error!(error = %e, "transport receive error"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatcher");
                    break;
                }
            }
        }

        self.transport.shutdown().await?;
        info!("dispatcher stopped");
        Ok(())
    }

    /// Applies every rule that matches `inbound`.
    ///
    /// Prompt expiry is measured against the message timestamps reported by
    /// the transport. Errors are logged and never abort processing.
    pub async fn handle_inbound(&mut self, inbound: InboundMessage) {
        let conversation_id = inbound.conversation_id;
        let now = inbound.timestamp;
        let text = inbound.text_or_empty();

        debug!(
            conversation_id = %conversation_id,
            message_id = %inbound.id,
            has_reply = inbound.reply_to.is_some(),
            has_attachment = inbound.attachment.is_some(),
            "handling inbound message"
        );

        // Correlate against the prompt the user saw, before a command in the
        // same message replaces it.
        let answered = inbound
            .reply_to
            .as_ref()
            .and_then(|reply| self.correlator.classify_reply(conversation_id, reply, now));

        if let Some(command) = Command::parse(text) {
            self.issue_prompt(conversation_id, command, now).await;
        }

        if let Some(pending) = answered {
            let reply_text = self.run_lookup(&pending, text).await;
            self.say(conversation_id, &reply_text).await;
        }

        if let Some(attachment) = &inbound.attachment {
            self.replace_credentials(conversation_id, attachment).await;
        }
    }

    async fn greet(&self) {
        let recipient = self.credentials.current().recipient_id;
        for line in [format::GREETING, format::CONFIG_REQUEST] {
            self.say(recipient, line).await;
        }
    }

    async fn issue_prompt(
        &mut self,
        conversation_id: ConversationId,
        command: Command,
        now: DateTime<Utc>,
    ) {
        let prompt = self.correlator.issue(conversation_id, command, now);
        let outbound = OutboundMessage::prompt(conversation_id, prompt.prompt_text.as_str());

        match self.transport.send(outbound).await {
            Ok(message_id) => {
                debug!(
                    conversation_id = %conversation_id,
                    token = %prompt.token,
                    prompt_message_id = %message_id,
                    "prompt issued"
                );
                self.correlator
                    .record_prompt_id(conversation_id, prompt.token, message_id);
            }
            Err(e) => error!(
                conversation_id = %conversation_id,
                error = %e,
                "failed to send prompt"
            ),
        }
    }

    /// Validates the answer, runs the lookup, and returns the text to send.
    async fn run_lookup(&self, pending: &PendingPrompt, answer: &str) -> String {
        let kind = pending.kind.lookup_kind();
        let argument = match kind {
            LookupKind::Breach => validate::validate_email(answer),
            LookupKind::Malware => validate::validate_digest(answer),
        };
        let argument = match argument {
            Ok(argument) => argument,
            Err(e) => {
                info!(
                    conversation_id = %pending.conversation_id,
                    lookup = %kind,
                    reason = %e,
                    "rejected lookup argument"
                );
                return format::invalid_argument(kind).to_string();
            }
        };

        let credentials = self.credentials.current();
        let (client, key) = match kind {
            LookupKind::Breach => (&self.breach, credentials.breach_service_key.expose_secret()),
            LookupKind::Malware => (
                &self.malware,
                credentials.malware_service_key.expose_secret(),
            ),
        };

        let result = client.lookup(&argument, key).await;
        if let LookupResult::ServiceError(reason) = &result {
            warn!(
                conversation_id = %pending.conversation_id,
                lookup = %kind,
                reason = reason.as_str(),
                "lookup failed"
            );
        } else {
            info!(
                conversation_id = %pending.conversation_id,
                lookup = %kind,
                "lookup completed"
            );
        }

        format::format_result(&result)
            .unwrap_or_else(|| format::lookup_failure(kind).to_string())
    }

    async fn replace_credentials(&self, conversation_id: ConversationId, attachment: &Attachment) {
        let recipient = self.credentials.current().recipient_id;
        if conversation_id != recipient {
            info!(
                conversation_id = %conversation_id,
                "ignoring document from a conversation other than the recipient"
            );
            return;
        }

        let bytes = match self.transport.fetch_attachment(attachment).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "failed to fetch credential payload");
                self.say(conversation_id, format::FILE_FETCH_FAILED).await;
                return;
            }
        };

        match self.credentials.replace(&bytes) {
            Ok(previous) => {
                let current = self.credentials.current();
                if previous.transport_token.expose_secret()
                    != current.transport_token.expose_secret()
                {
                    warn!("transport token changed; restart to poll with the new token");
                }
                if previous.recipient_id != current.recipient_id {
                    info!(
                        previous = %previous.recipient_id,
                        current = %current.recipient_id,
                        "recipient changed"
                    );
                }
                info!(path = %self.credentials.path().display(), "credential payload replaced");
                self.say(conversation_id, format::CONFIG_ACCEPTED).await;
            }
            Err(e) => {
                error!(error = %e, "failed to replace credential payload");
                self.say(conversation_id, format::CONFIG_UPDATE_FAILED).await;
            }
        }
    }

    /// Sends plain text, logging delivery failures.
    async fn say(&self, conversation_id: ConversationId, content: &str) {
        if let Err(e) = self
            .transport
            .send(OutboundMessage::text(conversation_id, content))
            .await
        {
            error!(
                conversation_id = %conversation_id,
                error = %e,
                "failed to send message"
            );
        }
    }
}
