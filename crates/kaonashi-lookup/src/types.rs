// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response shapes of the breach and malware services.
//!
//! Only the fields the bot reports on are declared; serde skips the rest.

use std::collections::BTreeMap;

use kaonashi_core::types::{BreachRecord, EngineVerdict};
use serde::Deserialize;

/// One entry of the breached-account response.
///
/// `Description` is deliberately not declared: it is long HTML and is never shown.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BreachEntry {
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub breach_date: String,
    #[serde(default)]
    pub title: String,
}

impl From<BreachEntry> for BreachRecord {
    fn from(entry: BreachEntry) -> Self {
        Self {
            source_name: entry.name,
            domain: entry.domain,
            breach_date: entry.breach_date,
            title: entry.title,
        }
    }
}

/// Top level of a file report.
#[derive(Debug, Deserialize)]
pub struct FileReport {
    pub data: FileData,
}

#[derive(Debug, Deserialize)]
pub struct FileData {
    #[serde(default)]
    pub id: String,
    pub attributes: FileAttributes,
}

#[derive(Debug, Deserialize)]
pub struct FileAttributes {
    #[serde(default)]
    pub last_analysis_results: BTreeMap<String, EngineEntry>,
}

/// One engine's entry in `last_analysis_results`.
#[derive(Debug, Deserialize)]
pub struct EngineEntry {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub result: Option<String>,
}

impl From<EngineEntry> for EngineVerdict {
    fn from(entry: EngineEntry) -> Self {
        Self {
            category: entry.category,
            result: entry.result,
        }
    }
}

/// Error envelope both services use for non-success responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
