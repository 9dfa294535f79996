// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt correlation.
//!
//! Tracks the one outstanding question per conversation and decides whether
//! an inbound reply answers it. A reply is matched by the transport message id
//! of the prompt when both sides know it, and by the literal prompt text
//! otherwise. The most recently issued prompt always wins.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kaonashi_core::types::{ConversationId, LookupKind, MessageId, ReplyTarget};
use tracing::debug;
use uuid::Uuid;

/// Prompt sent after `/checkpwned`.
pub const EMAIL_PROMPT: &str = "Please enter your email address:";

/// Prompt sent after `/checkmalware`.
pub const HASH_PROMPT: &str = "Please enter the hash of the file:";

/// A recognized chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CheckPwned,
    CheckMalware,
}

impl Command {
    /// Recognizes a command by its text prefix.
    pub fn parse(text: &str) -> Option<Self> {
        if text.starts_with("/checkpwned") {
            Some(Self::CheckPwned)
        } else if text.starts_with("/checkmalware") {
            Some(Self::CheckMalware)
        } else {
            None
        }
    }

    fn prompt_kind(self) -> PromptKind {
        match self {
            Self::CheckPwned => PromptKind::EmailRequested,
            Self::CheckMalware => PromptKind::HashRequested,
        }
    }
}

/// What the bot is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    EmailRequested,
    HashRequested,
}

impl PromptKind {
    pub fn prompt_text(self) -> &'static str {
        match self {
            Self::EmailRequested => EMAIL_PROMPT,
            Self::HashRequested => HASH_PROMPT,
        }
    }

    /// The lookup an answer to this prompt is routed to.
    pub fn lookup_kind(self) -> LookupKind {
        match self {
            Self::EmailRequested => LookupKind::Breach,
            Self::HashRequested => LookupKind::Malware,
        }
    }

    /// Text fallback used when the prompt's message id is unknown.
    ///
    /// Chat clients may append to the quoted email prompt, so that one only
    /// needs to be a prefix; the hash prompt must match exactly.
    fn matches_text(self, replied_text: &str) -> bool {
        match self {
            Self::EmailRequested => replied_text.starts_with(EMAIL_PROMPT),
            Self::HashRequested => replied_text == HASH_PROMPT,
        }
    }
}

/// Per-conversation state derived from the pending prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingEmail,
    AwaitingHash,
}

/// An outstanding question awaiting one conversation's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    pub conversation_id: ConversationId,
    pub kind: PromptKind,
    pub prompt_text: String,
    pub issued_at: DateTime<Utc>,
    /// Distinguishes this prompt from any earlier one for the same conversation.
    pub token: Uuid,
    /// Transport id of the sent prompt, once delivery succeeded.
    pub prompt_message_id: Option<MessageId>,
}

impl PendingPrompt {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A clock that went backwards never expires a prompt.
        (now - self.issued_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }

    fn is_answered_by(&self, reply: &ReplyTarget) -> bool {
        match (&self.prompt_message_id, &reply.message_id) {
            (Some(prompt_id), Some(reply_id)) => prompt_id == reply_id,
            _ => reply
                .text
                .as_deref()
                .is_some_and(|text| self.kind.matches_text(text)),
        }
    }
}

/// The per-conversation prompt table, owned by the dispatcher.
#[derive(Debug)]
pub struct Correlator {
    pending: HashMap<ConversationId, PendingPrompt>,
    ttl: Duration,
}

impl Correlator {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
        }
    }

    pub fn state(&self, conversation_id: ConversationId, now: DateTime<Utc>) -> ConversationState {
        match self.pending.get(&conversation_id) {
            Some(p) if !p.is_expired(now, self.ttl) => match p.kind {
                PromptKind::EmailRequested => ConversationState::AwaitingEmail,
                PromptKind::HashRequested => ConversationState::AwaitingHash,
            },
            _ => ConversationState::Idle,
        }
    }

    /// Records a new prompt for `command`, replacing any earlier one.
    ///
    /// Expired prompts of every conversation are purged first.
    pub fn issue(
        &mut self,
        conversation_id: ConversationId,
        command: Command,
        now: DateTime<Utc>,
    ) -> PendingPrompt {
        self.purge_expired(now);

        let kind = command.prompt_kind();
        let prompt = PendingPrompt {
            conversation_id,
            kind,
            prompt_text: kind.prompt_text().to_string(),
            issued_at: now,
            token: Uuid::new_v4(),
            prompt_message_id: None,
        };

        if let Some(previous) = self.pending.insert(conversation_id, prompt.clone()) {
            debug!(
                conversation_id = %conversation_id,
                abandoned = %previous.token,
                "pending prompt replaced"
            );
        }
        prompt
    }

    /// Attaches the transport id of a delivered prompt.
    ///
    /// Ignored when `token` no longer names the pending prompt.
    pub fn record_prompt_id(
        &mut self,
        conversation_id: ConversationId,
        token: Uuid,
        message_id: MessageId,
    ) {
        if let Some(pending) = self.pending.get_mut(&conversation_id)
            && pending.token == token
        {
            pending.prompt_message_id = Some(message_id);
        }
    }

    /// Consumes and returns the pending prompt if `reply` answers it.
    ///
    /// Expired prompts are dropped and never match. An unmatched reply leaves
    /// the pending prompt in place.
    pub fn classify_reply(
        &mut self,
        conversation_id: ConversationId,
        reply: &ReplyTarget,
        now: DateTime<Utc>,
    ) -> Option<PendingPrompt> {
        let pending = self.pending.get(&conversation_id)?;

        if pending.is_expired(now, self.ttl) {
            debug!(
                conversation_id = %conversation_id,
                token = %pending.token,
                "pending prompt expired"
            );
            self.pending.remove(&conversation_id);
            return None;
        }

        if !pending.is_answered_by(reply) {
            return None;
        }
        self.pending.remove(&conversation_id)
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let before = self.pending.len();
        self.pending.retain(|_, p| !p.is_expired(now, ttl));
        let purged = before - self.pending.len();
        if purged > 0 {
            debug!(purged, "expired prompts discarded");
        }
    }

    /// Number of conversations with an outstanding prompt.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
