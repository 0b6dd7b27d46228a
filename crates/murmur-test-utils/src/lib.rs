// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for Murmur integration tests.
//!
//! Fast, deterministic, CI-runnable stand-ins for the Telegram channel and
//! the Gemini provider.
//!
//! - [`MockChannel`] - messaging channel with message injection and capture
//! - [`MockProvider`] - provider with scripted replies and scripted failures

pub mod mock_channel;
pub mod mock_provider;

pub use mock_channel::MockChannel;
pub use mock_provider::MockProvider;
