// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kaonashi check-config` command implementation.
//!
//! Verifies that the bot could start: settings were loaded, the credential
//! payload parses, and optionally that Telegram accepts the bot token.

use kaonashi_config::CredentialStore;
use kaonashi_config::model::KaonashiConfig;
use kaonashi_core::types::HealthStatus;
use kaonashi_core::PluginAdapter;
use kaonashi_telegram::TelegramTransport;
use secrecy::ExposeSecret;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

/// Runs all checks, prints a report, and returns whether none failed.
pub async fn run_check(config: &KaonashiConfig, online: bool) -> bool {
    let mut results = vec![check_settings(config)];

    let (credentials, store) = check_credentials(config);
    results.push(credentials);

    if online {
        results.push(match &store {
            Some(store) => check_transport(config, store).await,
            None => CheckResult {
                name: "telegram",
                status: CheckStatus::Warn,
                message: "skipped, no usable bot token".into(),
            },
        });
    }

    print_report(&results)
}

fn check_settings(config: &KaonashiConfig) -> CheckResult {
    CheckResult {
        name: "settings",
        status: CheckStatus::Pass,
        message: format!(
            "agent.name={}, credentials.path={}",
            config.agent.name, config.credentials.path
        ),
    }
}

fn check_credentials(config: &KaonashiConfig) -> (CheckResult, Option<CredentialStore>) {
    match kaonashi_config::open_credentials(config) {
        Ok(store) => {
            let recipient = store.current().recipient_id;
            (
                CheckResult {
                    name: "credentials",
                    status: CheckStatus::Pass,
                    message: format!("complete, recipient {recipient}"),
                },
                Some(store),
            )
        }
        Err(errors) => {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            (
                CheckResult {
                    name: "credentials",
                    status: CheckStatus::Fail,
                    message,
                },
                None,
            )
        }
    }
}

async fn check_transport(config: &KaonashiConfig, store: &CredentialStore) -> CheckResult {
    let credentials = store.current();
    let transport =
        match TelegramTransport::new(credentials.transport_token.expose_secret(), &config.telegram)
        {
            Ok(transport) => transport,
            Err(e) => {
                return CheckResult {
                    name: "telegram",
                    status: CheckStatus::Fail,
                    message: e.to_string(),
                };
            }
        };

    let (status, message) = match transport.health_check().await {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "bot token accepted".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: "telegram",
        status,
        message,
    }
}

fn print_report(results: &[CheckResult]) -> bool {
    println!();
    println!("  kaonashi check-config");
    println!("  {}", "-".repeat(50));
    for result in results {
        let symbol = match result.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "!!",
            CheckStatus::Fail => "xx",
        };
        println!("  [{symbol}] {:<12} {}", result.name, result.message);
    }
    println!();

    results.iter().all(|r| r.status != CheckStatus::Fail)
}
