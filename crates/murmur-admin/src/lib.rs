// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP surface for the Murmur relay.
//!
//! Serves the read/maintenance API over the conversation store, the
//! Telegram webhook intake, and a health endpoint. Built on axum with
//! permissive CORS; deployments are expected to front this with their own
//! access control.

pub mod handlers;
pub mod server;
pub mod webhook;

pub use server::{start_server, AdminState};
