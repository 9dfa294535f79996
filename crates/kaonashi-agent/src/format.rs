// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing text: lookup result rendering and the fixed bot replies.

use std::fmt::Write;

use kaonashi_core::types::{LookupKind, LookupResult, MalwareVerdict};

pub const GREETING: &str = "Chomp, chomp... Kaonashi is hungry, upload config.json with API Key!";
pub const CONFIG_REQUEST: &str = "Please send your configuration file (config.json).";
pub const CONFIG_ACCEPTED: &str =
    "Gnom...Gnom...Config file eaten successfully. /checkmalware or /checkpwned";
pub const FILE_FETCH_FAILED: &str = "An error occurred while getting the file.";
pub const CONFIG_UPDATE_FAILED: &str = "An error occurred while updating the config file.";
pub const BREACH_LOOKUP_FAILED: &str = "An error occurred while checking the pwned status.";
pub const MALWARE_LOOKUP_FAILED: &str = "An error occurred while checking for malware.";
pub const INVALID_EMAIL: &str =
    "That doesn't look like an email address. Send /checkpwned to try again.";
pub const INVALID_DIGEST: &str =
    "That doesn't look like an MD5, SHA-1 or SHA-256 digest. Send /checkmalware to try again.";

pub const NOT_PWNED: &str = "Good news! Your email has not been pwned.";
pub const PWNED_HEADER: &str = "Your email has been pwned in the following breaches:\n\n";
pub const MALWARE_POSITIVE: &str = "Positive Found: This is a malware 💀";
pub const NO_ANALYSIS: &str = "No analysis results available.";

/// Generic failure reply for a lookup that returned a service error.
pub fn lookup_failure(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Breach => BREACH_LOOKUP_FAILED,
        LookupKind::Malware => MALWARE_LOOKUP_FAILED,
    }
}

/// Rejection reply for an argument that failed validation.
pub fn invalid_argument(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Breach => INVALID_EMAIL,
        LookupKind::Malware => INVALID_DIGEST,
    }
}

/// Renders a lookup result for the user.
///
/// Returns `None` for [`LookupResult::ServiceError`]; failure details stay in
/// the logs and the caller sends [`lookup_failure`] instead.
pub fn format_result(result: &LookupResult) -> Option<String> {
    match result {
        LookupResult::NotFound => Some(NOT_PWNED.to_string()),
        LookupResult::BreachList(records) if records.is_empty() => Some(NOT_PWNED.to_string()),
        LookupResult::BreachList(records) => {
            let mut out = String::from(PWNED_HEADER);
            for r in records {
                let _ = write!(
                    out,
                    "Name: {}\nDomain: {}\nBreach Date: {}\nTitle: {}\n\n",
                    r.source_name, r.domain, r.breach_date, r.title
                );
            }
            Some(out)
        }
        LookupResult::Malware(verdict) => Some(format_verdict(verdict)),
        LookupResult::ServiceError(_) => None,
    }
}

fn format_verdict(verdict: &MalwareVerdict) -> String {
    if verdict.is_positive {
        MALWARE_POSITIVE.to_string()
    } else if verdict.engine_results.is_empty() {
        NO_ANALYSIS.to_string()
    } else {
        format!(
            "No engine flagged this file as malicious ({} engines checked).",
            verdict.engine_results.len()
        )
    }
}
