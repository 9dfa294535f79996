// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the breach-exposure service (Have I Been Pwned v3).

use std::time::Duration;

use async_trait::async_trait;
use kaonashi_config::model::BreachConfig;
use kaonashi_core::types::{BreachRecord, LookupKind, LookupResult};
use kaonashi_core::{KaonashiError, LookupAdapter};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::BreachEntry;
use crate::{build_http_client, endpoint};

/// Header carrying the subscription key.
const API_KEY_HEADER: &str = "hibp-api-key";

/// HTTP client for breached-account lookups.
#[derive(Debug, Clone)]
pub struct BreachClient {
    client: reqwest::Client,
    base_url: String,
}

impl BreachClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: &BreachConfig) -> Result<Self, KaonashiError> {
        let client = build_http_client(
            LookupKind::Breach,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Looks up every breach the service associates with `email`.
    ///
    /// Asks for the non-truncated response so each entry carries its domain,
    /// date, and title. Failures are returned as [`LookupResult::ServiceError`]
    /// and never retried.
    pub async fn lookup_breaches(&self, email: &str, key: &str) -> LookupResult {
        let mut url = match endpoint(&self.base_url, &["breachedaccount", email]) {
            Ok(url) => url,
            Err(e) => return LookupResult::ServiceError(e.to_string()),
        };
        url.query_pairs_mut().append_pair("truncateResponse", "false");

        let response = match self
            .client
            .get(url)
            .header(API_KEY_HEADER, key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "breach lookup request failed");
                return LookupResult::ServiceError(format!("request failed: {e}"));
            }
        };

        let status = response.status();
        debug!(status = %status, "breach lookup response received");

        match status {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => LookupResult::NotFound,
            StatusCode::OK => match response.bytes().await {
                Ok(body) => parse_breaches(&body),
                Err(e) => LookupResult::ServiceError(format!("failed to read response body: {e}")),
            },
            _ => {
                let body = response.text().await.unwrap_or_default();
                LookupResult::ServiceError(format!("{status}: {body}"))
            }
        }
    }
}

/// Normalizes a 200 body: empty body or empty array means nothing was found.
fn parse_breaches(body: &[u8]) -> LookupResult {
    if body.iter().all(u8::is_ascii_whitespace) {
        return LookupResult::NotFound;
    }
    match serde_json::from_slice::<Vec<BreachEntry>>(body) {
        Ok(entries) if entries.is_empty() => LookupResult::NotFound,
        Ok(entries) => {
            LookupResult::BreachList(entries.into_iter().map(BreachRecord::from).collect())
        }
        Err(e) => LookupResult::ServiceError(format!("malformed breach response: {e}")),
    }
}

#[async_trait]
impl LookupAdapter for BreachClient {
    fn kind(&self) -> LookupKind {
        LookupKind::Breach
    }

    async fn lookup(&self, query: &str, key: &str) -> LookupResult {
        self.lookup_breaches(query, key).await
    }
}
