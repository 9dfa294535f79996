// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kaonashi bot.
//!
//! Provides the adapter traits, error type, and the message and lookup result
//! types passed between the transport, the lookup clients, and the dispatcher.

pub mod error;
pub mod traits;
pub mod types;

pub use error::KaonashiError;
pub use types::{ConversationId, HealthStatus, LookupKind, LookupResult, MessageId};

pub use traits::{ChannelAdapter, LookupAdapter, PluginAdapter};
