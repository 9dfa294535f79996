// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup adapter trait for the breach and malware services.

use async_trait::async_trait;

use crate::types::{LookupKind, LookupResult};

/// A client for one external lookup service.
///
/// Lookups never fail with an `Err`: transport and status failures are folded
/// into [`LookupResult::ServiceError`] so the caller always has exactly one
/// result to report back to the conversation.
#[async_trait]
pub trait LookupAdapter: Send + Sync + 'static {
    /// Which query kind this client answers.
    fn kind(&self) -> LookupKind;

    /// Queries the service for `query`, authenticating with `key`.
    async fn lookup(&self, query: &str, key: &str) -> LookupResult;
}
