// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the transport, lookup clients, and the dispatcher.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies a chat conversation (a Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message within its conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// The message an inbound message was sent in reply to.
///
/// Transports differ in what they report about the replied-to message, so
/// both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyTarget {
    pub message_id: Option<MessageId>,
    pub text: Option<String>,
}

/// A reference to a file attached to an inbound message.
///
/// The bytes are not downloaded until the dispatcher asks for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: Option<String>,
    pub size: Option<u64>,
}

/// An inbound message received from the chat transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: Option<String>,
    pub text: Option<String>,
    pub reply_to: Option<ReplyTarget>,
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Returns the message body, or an empty string for media-only messages.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// An outbound message to be sent via the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub conversation_id: ConversationId,
    pub content: String,
    /// Ask the client to open a reply box addressed to this message.
    pub force_reply: bool,
}

impl OutboundMessage {
    /// A plain text message.
    pub fn text(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
            force_reply: false,
        }
    }

    /// A question the user is expected to answer by replying to it.
    pub fn prompt(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
            force_reply: true,
        }
    }
}

/// Which external lookup service a query is routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    /// Breach-exposure registry, keyed by email address.
    Breach,
    /// Malware-reputation index, keyed by file digest.
    Malware,
}

/// One data-breach incident returned by the breach-exposure service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachRecord {
    pub source_name: String,
    pub domain: String,
    pub breach_date: String,
    pub title: String,
}

/// A single scan engine's verdict on a digest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineVerdict {
    /// Service category, e.g. `malicious`, `suspicious`, `undetected`.
    pub category: String,
    /// Engine-specific signature name, if any.
    pub result: Option<String>,
}

impl EngineVerdict {
    /// Whether this engine considers the file harmful.
    pub fn is_detection(&self) -> bool {
        matches!(self.category.as_str(), "malicious" | "suspicious")
    }
}

/// Aggregate verdict for one digest query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MalwareVerdict {
    pub is_positive: bool,
    pub engine_results: BTreeMap<String, EngineVerdict>,
}

impl MalwareVerdict {
    /// Builds a verdict from per-engine results; positive iff any engine detects.
    pub fn from_engines(engine_results: BTreeMap<String, EngineVerdict>) -> Self {
        let is_positive = engine_results.values().any(EngineVerdict::is_detection);
        Self {
            is_positive,
            engine_results,
        }
    }

    /// Number of engines that flagged the file.
    pub fn detections(&self) -> usize {
        self.engine_results
            .values()
            .filter(|v| v.is_detection())
            .count()
    }
}

/// The normalized outcome of a lookup, handed to the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Breach incidents in the service's native order.
    BreachList(Vec<BreachRecord>),
    /// Multi-engine verdict for a digest.
    Malware(MalwareVerdict),
    /// The service has no record of the query.
    NotFound,
    /// Non-success status, transport failure, or malformed body.
    ServiceError(String),
}

impl LookupResult {
    pub fn is_service_error(&self) -> bool {
        matches!(self, LookupResult::ServiceError(_))
    }
}
