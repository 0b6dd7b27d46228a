// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AssistantPatch, AssistantProfile, Dialog, NewAssistant, TableCounts, User,
};

/// Adapter for persistence backends.
///
/// All operations are single-shot and non-transactional; fail-soft
/// defaulting is layered on top by the store gateway, not here.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and runs pending migrations.
    async fn initialize(&self) -> Result<(), MurmurError>;

    /// Flushes and closes the backend.
    async fn close(&self) -> Result<(), MurmurError>;

    // --- User operations ---

    async fn get_user(&self, tg_id: i64) -> Result<Option<User>, MurmurError>;

    async fn insert_user(&self, user: &User) -> Result<(), MurmurError>;

    /// Refreshes a user's last-activity timestamp.
    async fn touch_user(&self, tg_id: i64, last_activity: &str) -> Result<(), MurmurError>;

    /// Newest users first, bounded.
    async fn list_users(&self, limit: i64) -> Result<Vec<User>, MurmurError>;

    // --- Dialog operations ---

    /// Appends one dialog row; the row's `id` field is ignored and assigned
    /// by the backend.
    async fn insert_dialog(&self, dialog: &Dialog) -> Result<(), MurmurError>;

    /// The `limit` newest rows for one user, id descending.
    async fn recent_dialogs(&self, tg_id: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError>;

    /// All rows for one user, chronological.
    async fn dialogs_for_user(&self, tg_id: i64) -> Result<Vec<Dialog>, MurmurError>;

    /// Global dialog log, newest first, paginated (1-based page).
    async fn list_dialogs(&self, page: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError>;

    // --- Assistant operations ---

    async fn list_assistants(&self) -> Result<Vec<AssistantProfile>, MurmurError>;

    async fn create_assistant(&self, fields: &NewAssistant) -> Result<AssistantProfile, MurmurError>;

    /// Applies the patch and returns the updated row, or `None` when no
    /// assistant has the given id.
    async fn update_assistant(
        &self,
        id: &str,
        patch: &AssistantPatch,
    ) -> Result<Option<AssistantProfile>, MurmurError>;

    /// Returns whether a row was actually deleted.
    async fn delete_assistant(&self, id: &str) -> Result<bool, MurmurError>;

    // --- Admin operations ---

    /// Row counts for all three tables. Doubles as the existence probe the
    /// store gateway runs at construction time.
    async fn counts(&self) -> Result<TableCounts, MurmurError>;

    /// Executes a raw read statement and returns rows as JSON objects.
    /// Mutation screening happens at the admin surface, before this call.
    async fn raw_query(&self, sql: &str) -> Result<Vec<serde_json::Value>, MurmurError>;
}
