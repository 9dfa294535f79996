// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock lookup client with canned results and recorded calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use kaonashi_core::types::{LookupKind, LookupResult};
use kaonashi_core::LookupAdapter;

/// One recorded `lookup()` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub query: String,
    pub key: String,
}

/// A mock lookup client.
///
/// Returns queued results in order, then `fallback` once the queue is empty.
#[derive(Clone)]
pub struct MockLookup {
    kind: LookupKind,
    results: Arc<Mutex<VecDeque<LookupResult>>>,
    fallback: LookupResult,
    calls: Arc<Mutex<Vec<LookupCall>>>,
}

impl MockLookup {
    /// A mock that answers `NotFound` until told otherwise.
    pub fn new(kind: LookupKind) -> Self {
        Self::with_fallback(kind, LookupResult::NotFound)
    }

    pub fn with_fallback(kind: LookupKind, fallback: LookupResult) -> Self {
        Self {
            kind,
            results: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a result for the next call.
    pub async fn push_result(&self, result: LookupResult) {
        self.results.lock().await.push_back(result);
    }

    pub async fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl LookupAdapter for MockLookup {
    fn kind(&self) -> LookupKind {
        self.kind
    }

    async fn lookup(&self, query: &str, key: &str) -> LookupResult {
        self.calls.lock().await.push(LookupCall {
            query: query.to_string(),
            key: key.to_string(),
        });
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
