// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Kaonashi bot.

use thiserror::Error;

/// The primary error type used across all Kaonashi adapter traits and core operations.
#[derive(Debug, Error)]
pub enum KaonashiError {
    /// Credential payload or bootstrap settings are missing, unparseable, or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage failures (persisting the credential payload).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (send, receive, attachment download).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The transport's inbound stream ended; no further messages will arrive.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// Lookup client construction or request building failed.
    #[error("{service} lookup error: {message}")]
    Lookup {
        service: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// User-supplied lookup argument was rejected before dispatch.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KaonashiError {
    /// Shorthand for a [`KaonashiError::Channel`] without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when the error means the transport can no longer deliver events.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, Self::ChannelClosed(_))
    }
}
