// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Traits use `#[async_trait]` so they can be used as trait objects by the
//! dispatcher.

pub mod adapter;
pub mod channel;
pub mod lookup;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use lookup::LookupAdapter;
