// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Murmur relay.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed query modules for users,
//! dialogs, and assistants, and the fail-soft [`StoreGateway`] the message
//! pipeline talks to.

pub mod adapter;
pub mod database;
pub mod gateway;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use gateway::StoreGateway;
pub use models::*;
