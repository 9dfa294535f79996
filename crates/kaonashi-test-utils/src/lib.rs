// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Kaonashi integration tests.
//!
//! Provides mock adapters and a dispatcher harness for fast, deterministic
//! tests without Telegram or the lookup services.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock chat transport with message injection and capture
//! - [`MockLookup`] - Mock lookup client with canned results
//! - [`TestHarness`] - Dispatcher wired to the mocks and a temp credential store

pub mod harness;
pub mod mock_lookup;
pub mod mock_transport;

pub use harness::{RECIPIENT, TestHarness, credentials_json};
pub use mock_lookup::{LookupCall, MockLookup};
pub use mock_transport::{MockTransport, SentMessage};
