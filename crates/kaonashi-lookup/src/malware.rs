// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the malware-reputation service (VirusTotal v3).

use std::time::Duration;

use async_trait::async_trait;
use kaonashi_config::model::MalwareConfig;
use kaonashi_core::types::{EngineVerdict, LookupKind, LookupResult, MalwareVerdict};
use kaonashi_core::{KaonashiError, LookupAdapter};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, FileReport};
use crate::{build_http_client, endpoint};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-apikey";

/// HTTP client for file-report lookups by digest.
#[derive(Debug, Clone)]
pub struct MalwareClient {
    client: reqwest::Client,
    base_url: String,
}

impl MalwareClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: &MalwareConfig) -> Result<Self, KaonashiError> {
        let client = build_http_client(
            LookupKind::Malware,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetches the latest multi-engine analysis for `digest`.
    ///
    /// The verdict is positive only when at least one engine reports the file
    /// as malicious or suspicious.
    pub async fn lookup_malware(&self, digest: &str, key: &str) -> LookupResult {
        let url = match endpoint(&self.base_url, &["files", digest]) {
            Ok(url) => url,
            Err(e) => return LookupResult::ServiceError(e.to_string()),
        };

        let response = match self
            .client
            .get(url)
            .header(API_KEY_HEADER, key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "malware lookup request failed");
                return LookupResult::ServiceError(format!("request failed: {e}"));
            }
        };

        let status = response.status();
        debug!(status = %status, "malware lookup response received");

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return LookupResult::ServiceError(format!("failed to read response body: {e}"));
            }
        };

        if !status.is_success() {
            let detail = match serde_json::from_slice::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("{}: {}", api_err.error.code, api_err.error.message),
                Err(_) => String::from_utf8_lossy(&body).into_owned(),
            };
            return LookupResult::ServiceError(format!("{status}: {detail}"));
        }

        match serde_json::from_slice::<FileReport>(&body) {
            Ok(report) => {
                let engines = report
                    .data
                    .attributes
                    .last_analysis_results
                    .into_iter()
                    .map(|(engine, entry)| (engine, EngineVerdict::from(entry)))
                    .collect();
                let verdict = MalwareVerdict::from_engines(engines);
                debug!(
                    report_id = report.data.id.as_str(),
                    engines = verdict.engine_results.len(),
                    detections = verdict.detections(),
                    "file report parsed"
                );
                LookupResult::Malware(verdict)
            }
            Err(e) => LookupResult::ServiceError(format!("malformed file report: {e}")),
        }
    }
}

#[async_trait]
impl LookupAdapter for MalwareClient {
    fn kind(&self) -> LookupKind {
        LookupKind::Malware
    }

    async fn lookup(&self, query: &str, key: &str) -> LookupResult {
        self.lookup_malware(query, key).await
    }
}
