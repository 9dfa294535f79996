// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Kaonashi bot.
//!
//! Two layers live here:
//! - **Bootstrap settings** ([`KaonashiConfig`]): TOML files plus `KAONASHI_*`
//!   environment overrides, validated strictly and reported as miette diagnostics.
//! - **Credentials** ([`CredentialStore`]): the operator-uploaded JSON payload
//!   with the transport token, recipient, and lookup keys, swapped atomically at
//!   runtime.
//!
//! ```no_run
//! use kaonashi_config::{load_and_validate, open_credentials};
//!
//! let config = load_and_validate().expect("settings errors");
//! let store = open_credentials(&config).expect("credential errors");
//! println!("recipient: {}", store.current().recipient_id);
//! ```

pub mod credentials;
pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

pub use credentials::Credentials;
pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::KaonashiConfig;
pub use store::CredentialStore;

use std::path::Path;

/// Load settings from the standard hierarchy and validate them.
pub fn load_and_validate() -> Result<KaonashiConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load settings from one explicit file (plus env overrides) and validate them.
pub fn load_and_validate_path(path: &Path) -> Result<KaonashiConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load settings from an inline TOML string and validate them.
pub fn load_and_validate_str(toml_content: &str) -> Result<KaonashiConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Open the credential payload named by `config.credentials.path`.
///
/// Failure here is fatal at startup; at runtime the payload is replaced
/// through [`CredentialStore::replace`] instead.
pub fn open_credentials(config: &KaonashiConfig) -> Result<CredentialStore, Vec<ConfigError>> {
    CredentialStore::open(&config.credentials.path).map_err(|e| {
        vec![ConfigError::Credentials {
            path: config.credentials.path.clone(),
            message: e.to_string(),
        }]
    })
}

/// Read every settings file that exists, for diagnostic source spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    [Some(local), loader::user_config_path(), Some(loader::SYSTEM_CONFIG_PATH.into())]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
