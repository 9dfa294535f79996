// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential payload: transport token, recipient, and lookup keys.

use kaonashi_core::ConversationId;
use kaonashi_core::KaonashiError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Wire form of the payload, as uploaded by the operator.
///
/// Fields default to empty so that every missing field can be reported at
/// once instead of stopping at the first one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialsPayload {
    #[serde(default)]
    telegram_bot_token: String,
    #[serde(default)]
    chat_id: i64,
    #[serde(default)]
    hibp_api_key: String,
    #[serde(default)]
    vt_api_key: String,
}

/// The validated credential set.
///
/// Always complete: every field is non-empty. Replaced as a whole, never
/// mutated field by field.
#[derive(Debug)]
pub struct Credentials {
    pub transport_token: SecretString,
    pub recipient_id: ConversationId,
    pub breach_service_key: SecretString,
    pub malware_service_key: SecretString,
}

impl Credentials {
    /// Parse and validate a raw payload.
    pub fn parse(bytes: &[u8]) -> Result<Self, KaonashiError> {
        let payload: CredentialsPayload = serde_json::from_slice(bytes)
            .map_err(|e| KaonashiError::Config(format!("credential payload is not valid: {e}")))?;

        let mut missing = Vec::new();
        if payload.telegram_bot_token.trim().is_empty() {
            missing.push("telegram_bot_token");
        }
        if payload.chat_id == 0 {
            missing.push("chat_id");
        }
        if payload.hibp_api_key.trim().is_empty() {
            missing.push("hibp_api_key");
        }
        if payload.vt_api_key.trim().is_empty() {
            missing.push("vt_api_key");
        }
        if !missing.is_empty() {
            return Err(KaonashiError::Config(format!(
                "credential payload is missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            transport_token: SecretString::from(payload.telegram_bot_token.trim().to_string()),
            recipient_id: ConversationId(payload.chat_id),
            breach_service_key: SecretString::from(payload.hibp_api_key.trim().to_string()),
            malware_service_key: SecretString::from(payload.vt_api_key.trim().to_string()),
        })
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.recipient_id == other.recipient_id
            && self.transport_token.expose_secret() == other.transport_token.expose_secret()
            && self.breach_service_key.expose_secret() == other.breach_service_key.expose_secret()
            && self.malware_service_key.expose_secret()
                == other.malware_service_key.expose_secret()
    }
}

impl Eq for Credentials {}
