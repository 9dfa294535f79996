// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap settings loader using Figment for layered merging.
//!
//! Lookup order: `./kaonashi.toml` > `~/.config/kaonashi/kaonashi.toml` >
//! `/etc/kaonashi/kaonashi.toml`, with `KAONASHI_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KaonashiConfig;

/// System-wide settings file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/kaonashi/kaonashi.toml";

/// Settings file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "kaonashi.toml";

/// Top-level sections, used to turn `KAONASHI_BREACH_BASE_URL` into `breach.base_url`.
const SECTIONS: &[&str] = &[
    "agent",
    "credentials",
    "telegram",
    "breach",
    "malware",
    "correlator",
];

/// Path of the per-user settings file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kaonashi").join(LOCAL_CONFIG_FILE))
}

/// Load settings from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kaonashi/kaonashi.toml`
/// 3. `~/.config/kaonashi/kaonashi.toml`
/// 4. `./kaonashi.toml`
/// 5. `KAONASHI_*` environment variables
pub fn load_config() -> Result<KaonashiConfig, figment::Error> {
    build_figment().extract()
}

/// Load settings from an inline TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<KaonashiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KaonashiConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load settings from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KaonashiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KaonashiConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(KaonashiConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `KAONASHI_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `KAONASHI_CORRELATOR_PROMPT_TTL_SECS` maps to `correlator.prompt_ttl_secs`.
fn env_provider() -> Env {
    Env::prefixed("KAONASHI_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted settings path.
pub fn map_env_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}
