// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat transport.

use async_trait::async_trait;

use crate::error::KaonashiError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Attachment, InboundMessage, MessageId, OutboundMessage};

/// Adapter for the bidirectional chat transport.
///
/// Inbound messages are delivered in transport order through [`receive`];
/// the dispatcher is the only consumer.
///
/// [`receive`]: ChannelAdapter::receive
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts retrieving updates from the transport.
    async fn connect(&mut self) -> Result<(), KaonashiError>;

    /// Sends a message and returns the transport id of the sent message.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, KaonashiError>;

    /// Receives the next inbound message.
    async fn receive(&self) -> Result<InboundMessage, KaonashiError>;

    /// Downloads the bytes behind an attachment reference.
    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, KaonashiError>;
}
