// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument checks applied before a lookup is dispatched.

use kaonashi_core::error::KaonashiError;

/// Longest address accepted by common mail systems.
const MAX_EMAIL_LEN: usize = 254;

/// Trims `input` and checks that it looks like a mailbox address.
///
/// This is a shape check, not RFC 5322 parsing: one `@`, a non-empty local
/// part, and a dotted domain, with no whitespace anywhere.
pub fn validate_email(input: &str) -> Result<String, KaonashiError> {
    let email = input.trim();
    let invalid = || KaonashiError::Validation("not an email address".into());

    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    if domain.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    Ok(email.to_string())
}

/// Trims `input` and checks that it is an MD5, SHA-1 or SHA-256 hex digest.
///
/// Returns the digest lowercased.
pub fn validate_digest(input: &str) -> Result<String, KaonashiError> {
    let digest = input.trim();
    if !matches!(digest.len(), 32 | 40 | 64) || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(KaonashiError::Validation(
            "not an MD5, SHA-1 or SHA-256 digest".into(),
        ));
    }
    Ok(digest.to_ascii_lowercase())
}
