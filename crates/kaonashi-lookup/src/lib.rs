// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup clients for the two external services.
//!
//! [`BreachClient`] answers email queries against the breach-exposure
//! registry; [`MalwareClient`] answers digest queries against the
//! malware-reputation index. Both implement [`LookupAdapter`] and fold every
//! failure into [`LookupResult::ServiceError`].
//!
//! [`LookupAdapter`]: kaonashi_core::LookupAdapter
//! [`LookupResult::ServiceError`]: kaonashi_core::LookupResult::ServiceError

pub mod breach;
pub mod malware;
pub mod types;

use std::time::Duration;

use kaonashi_core::{KaonashiError, LookupKind};
use reqwest::Url;

pub use breach::BreachClient;
pub use malware::MalwareClient;

/// Builds the pooled HTTP client shared by all requests of one service.
fn build_http_client(
    kind: LookupKind,
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, KaonashiError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| KaonashiError::Lookup {
            service: kind.to_string(),
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Appends `segments` to `base`, percent-encoding each one as a single segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, KaonashiError> {
    let mut url = Url::parse(base)
        .map_err(|e| KaonashiError::Config(format!("invalid service URL `{base}`: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| KaonashiError::Config(format!("service URL `{base}` cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
