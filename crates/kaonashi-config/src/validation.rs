// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for bootstrap settings.

use crate::diagnostic::ConfigError;
use crate::model::KaonashiConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate settings for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &KaonashiConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.credentials.path.trim().is_empty() {
        fail("credentials.path must not be empty".to_string());
    }

    if config.telegram.inbound_buffer == 0 {
        fail("telegram.inbound_buffer must be at least 1".to_string());
    }

    for (key, url) in [
        ("breach.base_url", &config.breach.base_url),
        ("malware.base_url", &config.malware.base_url),
    ] {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            fail(format!("{key} `{url}` must be an http or https URL"));
        }
    }

    for (key, agent) in [
        ("breach.user_agent", &config.breach.user_agent),
        ("malware.user_agent", &config.malware.user_agent),
    ] {
        if agent.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    for (key, secs) in [
        ("breach.timeout_secs", config.breach.timeout_secs),
        ("malware.timeout_secs", config.malware.timeout_secs),
        ("correlator.prompt_ttl_secs", config.correlator.prompt_ttl_secs),
    ] {
        if secs == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
