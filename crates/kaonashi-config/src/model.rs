// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap settings model.
//!
//! These settings describe how the process runs (where the credential payload
//! lives, which service endpoints to call, how long a prompt stays answerable).
//! The secrets themselves are not here; they live in the credential payload
//! managed by [`CredentialStore`](crate::store::CredentialStore).
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos are reported at startup.

use serde::{Deserialize, Serialize};

/// Top-level bootstrap settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KaonashiConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Location of the credential payload.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Chat transport behaviour.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Breach-exposure service endpoint.
    #[serde(default)]
    pub breach: BreachConfig,

    /// Malware-reputation service endpoint.
    #[serde(default)]
    pub malware: MalwareConfig,

    /// Prompt correlation settings.
    #[serde(default)]
    pub correlator: CorrelatorConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "kaonashi".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the credential payload is read from and persisted to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Path of the JSON payload. Relative paths resolve against the working directory.
    #[serde(default = "default_credentials_path")]
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> String {
    "config.json".to_string()
}

/// Chat transport behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Send the greeting and config request to the recipient on startup.
    #[serde(default = "default_true")]
    pub greet_on_start: bool,

    /// Capacity of the queue between the poller and the dispatcher.
    #[serde(default = "default_inbound_buffer")]
    pub inbound_buffer: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            greet_on_start: true,
            inbound_buffer: default_inbound_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_inbound_buffer() -> usize {
    100
}

/// Breach-exposure service endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BreachConfig {
    #[serde(default = "default_breach_base_url")]
    pub base_url: String,

    /// The service refuses requests without a user agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            base_url: default_breach_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_breach_base_url() -> String {
    "https://haveibeenpwned.com/api/v3".to_string()
}

fn default_user_agent() -> String {
    "kaonashi".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Malware-reputation service endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MalwareConfig {
    #[serde(default = "default_malware_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MalwareConfig {
    fn default() -> Self {
        Self {
            base_url: default_malware_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_malware_base_url() -> String {
    "https://www.virustotal.com/api/v3".to_string()
}

/// Prompt correlation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorrelatorConfig {
    /// Seconds after which an unanswered prompt is discarded.
    #[serde(default = "default_prompt_ttl_secs")]
    pub prompt_ttl_secs: u64,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            prompt_ttl_secs: default_prompt_ttl_secs(),
        }
    }
}

fn default_prompt_ttl_secs() -> u64 {
    600
}
