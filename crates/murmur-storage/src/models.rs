// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the three tables.
//!
//! The record structs live in `murmur-core` because the adapter trait and
//! the admin surface both speak them; this module re-exports them so query
//! code reads naturally.

pub use murmur_core::types::{
    AssistantPatch, AssistantProfile, Dialog, NewAssistant, Role, TableCounts, User,
};

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC string with millisecond precision.
///
/// Every timestamp column in the schema uses this format so lexical order
/// matches chronological order.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
