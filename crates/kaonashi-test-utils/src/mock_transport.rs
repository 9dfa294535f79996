// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `MockTransport` implements `ChannelAdapter` with injectable inbound
//! messages, captured outbound messages, and canned attachment bytes.
//! Clones share state, so a test can keep a handle after boxing one clone
//! into the dispatcher.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use kaonashi_core::KaonashiError;
use kaonashi_core::traits::{ChannelAdapter, PluginAdapter};
use kaonashi_core::types::{Attachment, HealthStatus, InboundMessage, MessageId, OutboundMessage};

/// A message captured by [`MockTransport::send`], with the id it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: MessageId,
    pub message: OutboundMessage,
}

/// A mock chat transport for testing.
///
/// Sent messages get sequential ids `sent-1`, `sent-2`, ... so tests can
/// reply to a specific prompt.
#[derive(Clone, Default)]
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    attachments: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    notify: Arc<Notify>,
    next_id: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message for the next `receive()`.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Makes `file_id` downloadable with the given content.
    pub async fn add_attachment(&self, file_id: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.attachments
            .lock()
            .await
            .insert(file_id.into(), bytes.into());
    }

    /// After the queue drains, `receive()` reports the transport as closed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Makes every subsequent `send()` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Text of every sent message, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|s| s.message.content.clone())
            .collect()
    }

    /// The most recently sent message.
    pub async fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    async fn health_check(&self) -> Result<HealthStatus, KaonashiError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KaonashiError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockTransport {
    async fn connect(&mut self) -> Result<(), KaonashiError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, KaonashiError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(KaonashiError::channel("mock send failure"));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = MessageId(format!("sent-{n}"));
        self.sent.lock().await.push(SentMessage {
            id: id.clone(),
            message: msg,
        });
        Ok(id)
    }

    async fn receive(&self) -> Result<InboundMessage, KaonashiError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
                if self.closed.load(Ordering::SeqCst) {
                    return Err(KaonashiError::ChannelClosed("mock transport".into()));
                }
            }
            self.notify.notified().await;
        }
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, KaonashiError> {
        self.attachments
            .lock()
            .await
            .get(&attachment.file_id)
            .cloned()
            .ok_or_else(|| KaonashiError::channel(format!("unknown file {}", attachment.file_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaonashi_core::ConversationId;

    fn make_inbound(text: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId(format!("in-{text}")),
            conversation_id: ConversationId(1),
            sender_id: Some("1".into()),
            text: Some(text.to_string()),
            reply_to: None,
            attachment: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let transport = MockTransport::new();
        transport.inject_message(make_inbound("first")).await;
        transport.inject_message(make_inbound("second")).await;

        assert_eq!(transport.receive().await.unwrap().text.as_deref(), Some("first"));
        assert_eq!(transport.receive().await.unwrap().text.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn send_assigns_sequential_ids() {
        let transport = MockTransport::new();
        let first = transport
            .send(OutboundMessage::text(ConversationId(1), "a"))
            .await
            .unwrap();
        let second = transport
            .send(OutboundMessage::prompt(ConversationId(1), "b"))
            .await
            .unwrap();

        assert_eq!(first, MessageId("sent-1".into()));
        assert_eq!(second, MessageId("sent-2".into()));
        let sent = transport.sent_messages().await;
        assert!(!sent[0].message.force_reply);
        assert!(sent[1].message.force_reply);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let transport = MockTransport::new();
        let handle = transport.clone();
        transport
            .send(OutboundMessage::text(ConversationId(1), "hello"))
            .await
            .unwrap();
        assert_eq!(handle.sent_texts().await, vec!["hello".to_string()]);

        handle.clear_sent().await;
        assert_eq!(transport.sent_count().await, 0);
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let transport = MockTransport::new();
        let injector = transport.clone();

        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            injector.inject_message(make_inbound("delayed")).await;
        });

        let received = tokio::time::timeout(
            tokio::time::Duration::from_secs(2),
            transport.receive(),
        )
        .await
        .expect("receive timed out")
        .unwrap();
        assert_eq!(received.text.as_deref(), Some("delayed"));
    }

    #[tokio::test]
    async fn close_drains_then_errors() {
        let transport = MockTransport::new();
        transport.inject_message(make_inbound("last")).await;
        transport.close();

        assert!(transport.receive().await.is_ok());
        let err = transport.receive().await.unwrap_err();
        assert!(err.is_channel_closed());
    }

    #[tokio::test]
    async fn failing_sends_and_attachments() {
        let transport = MockTransport::new();
        transport.fail_sends(true);
        assert!(transport
            .send(OutboundMessage::text(ConversationId(1), "x"))
            .await
            .is_err());
        assert_eq!(transport.sent_count().await, 0);

        transport.add_attachment("f1", b"{}".to_vec()).await;
        let attachment = Attachment {
            file_id: "f1".into(),
            file_name: None,
            size: None,
        };
        assert_eq!(transport.fetch_attachment(&attachment).await.unwrap(), b"{}");

        let missing = Attachment {
            file_id: "nope".into(),
            ..attachment
        };
        assert!(transport.fetch_attachment(&missing).await.is_err());
    }
}
