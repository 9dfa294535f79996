// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for dispatcher integration testing.
//!
//! `TestHarness` assembles a [`Dispatcher`] over a [`MockTransport`], two
//! [`MockLookup`]s and a credential store persisted in a temp directory.
//! Messages are fed straight to `handle_inbound`, so each call returns once
//! every reply for that message has been sent.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kaonashi_agent::Dispatcher;
use kaonashi_config::model::KaonashiConfig;
use kaonashi_config::CredentialStore;
use kaonashi_core::types::{
    Attachment, ConversationId, InboundMessage, LookupKind, MessageId, ReplyTarget,
};
use kaonashi_core::KaonashiError;
use tempfile::TempDir;

use crate::mock_lookup::MockLookup;
use crate::mock_transport::{MockTransport, SentMessage};

/// Recipient id used by [`credentials_json`] and the default harness.
pub const RECIPIENT: ConversationId = ConversationId(4242);

/// A complete credential payload addressed to `recipient`.
pub fn credentials_json(recipient: ConversationId, suffix: &str) -> String {
    format!(
        r#"{{"telegram_bot_token":"123:token-{suffix}","chat_id":{},"hibp_api_key":"hibp-{suffix}","vt_api_key":"vt-{suffix}"}}"#,
        recipient.0
    )
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    recipient: ConversationId,
    prompt_ttl_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            recipient: RECIPIENT,
            prompt_ttl_secs: 600,
        }
    }

    pub fn with_recipient(mut self, recipient: ConversationId) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn with_prompt_ttl(mut self, secs: u64) -> Self {
        self.prompt_ttl_secs = secs;
        self
    }

    pub fn build(self) -> Result<TestHarness, KaonashiError> {
        let temp_dir =
            TempDir::new().map_err(|e| KaonashiError::Storage { source: e.into() })?;
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, credentials_json(self.recipient, "initial"))
            .map_err(|e| KaonashiError::Storage { source: e.into() })?;
        let store = Arc::new(CredentialStore::open(&path)?);

        let mut config = KaonashiConfig::default();
        config.correlator.prompt_ttl_secs = self.prompt_ttl_secs;
        config.credentials.path = path.display().to_string();

        let transport = MockTransport::new();
        let breach = MockLookup::new(LookupKind::Breach);
        let malware = MockLookup::new(LookupKind::Malware);

        let dispatcher = Dispatcher::new(
            Box::new(transport.clone()),
            Arc::new(breach.clone()),
            Arc::new(malware.clone()),
            store.clone(),
            &config,
        )?;

        Ok(TestHarness {
            dispatcher,
            transport,
            breach,
            malware,
            store,
            clock: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            next_inbound: 0,
            _temp_dir: temp_dir,
        })
    }
}

/// A dispatcher wired to mocks, with helpers for driving conversations.
pub struct TestHarness {
    pub dispatcher: Dispatcher,
    pub transport: MockTransport,
    pub breach: MockLookup,
    pub malware: MockLookup,
    pub store: Arc<CredentialStore>,
    clock: DateTime<Utc>,
    next_inbound: u64,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Moves the message clock forward.
    pub fn advance(&mut self, secs: i64) {
        self.clock += Duration::seconds(secs);
    }

    fn inbound(&mut self, conversation_id: ConversationId) -> InboundMessage {
        self.next_inbound += 1;
        InboundMessage {
            id: MessageId(format!("in-{}", self.next_inbound)),
            conversation_id,
            sender_id: Some(conversation_id.to_string()),
            text: None,
            reply_to: None,
            attachment: None,
            timestamp: self.clock,
        }
    }

    /// Sends a plain text message.
    pub async fn say(&mut self, conversation_id: ConversationId, text: &str) {
        let mut msg = self.inbound(conversation_id);
        msg.text = Some(text.to_string());
        self.dispatcher.handle_inbound(msg).await;
    }

    /// Replies to a previously sent bot message, as a client reporting both
    /// the replied-to id and text would.
    pub async fn reply_to(&mut self, conversation_id: ConversationId, to: &SentMessage, text: &str) {
        let target = ReplyTarget {
            message_id: Some(to.id.clone()),
            text: Some(to.message.content.clone()),
        };
        self.reply_with(conversation_id, target, text).await;
    }

    /// Replies with an explicit reply target.
    pub async fn reply_with(
        &mut self,
        conversation_id: ConversationId,
        target: ReplyTarget,
        text: &str,
    ) {
        let mut msg = self.inbound(conversation_id);
        msg.text = Some(text.to_string());
        msg.reply_to = Some(target);
        self.dispatcher.handle_inbound(msg).await;
    }

    /// Uploads a document whose bytes the transport will serve.
    pub async fn upload(&mut self, conversation_id: ConversationId, bytes: &[u8]) {
        let mut msg = self.inbound(conversation_id);
        let file_id = format!("file-{}", msg.id);
        self.transport.add_attachment(file_id.clone(), bytes).await;
        msg.attachment = Some(Attachment {
            file_id,
            file_name: Some("config.json".into()),
            size: Some(bytes.len() as u64),
        });
        self.dispatcher.handle_inbound(msg).await;
    }

    /// Delivers a prebuilt message unchanged.
    pub async fn deliver(&mut self, msg: InboundMessage) {
        self.dispatcher.handle_inbound(msg).await;
    }

    /// The most recent bot message, which must exist.
    pub async fn last_sent(&self) -> SentMessage {
        self.transport
            .last_sent()
            .await
            .unwrap_or_else(|| panic!("no message has been sent"))
    }
}
