// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fail-soft persistence gateway.
//!
//! The message pipeline never sees a storage error: a user lookup that
//! fails synthesizes a record from the inbound message, an append that
//! fails is logged and dropped, and a history read that fails yields an
//! empty context. Admin operations stay fallible; persona mutations are
//! additionally refused while the store is degraded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use murmur_core::types::{
    AssistantPatch, AssistantProfile, Dialog, InboundMessage, NewAssistant, Role, TableCounts,
    User,
};
use murmur_core::{MurmurError, StorageAdapter};

use crate::models::now_rfc3339;

/// Gateway over a [`StorageAdapter`] with fail-soft relay-path semantics.
pub struct StoreGateway {
    storage: Arc<dyn StorageAdapter>,
    degraded: AtomicBool,
}

impl StoreGateway {
    /// Wrap the adapter, probing it once. A failed probe latches the
    /// degraded flag; relay-path operations still run best-effort, persona
    /// mutations are refused.
    pub async fn connect(storage: Arc<dyn StorageAdapter>) -> Self {
        let degraded = match storage.counts().await {
            Ok(counts) => {
                debug!(
                    users = counts.users,
                    dialogs = counts.dialogs,
                    assistants = counts.assistants,
                    "store probe ok"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "store probe failed; running degraded");
                true
            }
        };
        Self {
            storage,
            degraded: AtomicBool::new(degraded),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Session grouping token for new dialog rows. Display-only; carries no
    /// uniqueness guarantee.
    fn session_token(tg_id: i64) -> String {
        format!("{tg_id}_{}", Utc::now().timestamp_millis())
    }

    fn synthesize_user(msg: &InboundMessage, now: &str) -> User {
        let full_name = match &msg.last_name {
            Some(last) => format!("{} {last}", msg.first_name),
            None => msg.first_name.clone(),
        };
        User {
            tg_id: msg.sender_id,
            full_name: Some(full_name),
            fio: None,
            phone: None,
            city: None,
            adress: None,
            is_blocked: false,
            last_activity: now.to_string(),
            created_at: now.to_string(),
        }
    }

    // --- Relay path (fail-soft) ---

    /// Fetch the sender's record, creating it on first contact. Never
    /// fails: a storage fault yields a record built from the message alone.
    pub async fn get_or_create_user(&self, msg: &InboundMessage) -> User {
        let now = now_rfc3339();
        match self.storage.get_user(msg.sender_id).await {
            Ok(Some(mut user)) => {
                if let Err(e) = self.storage.touch_user(msg.sender_id, &now).await {
                    warn!(tg_id = msg.sender_id, error = %e, "last_activity touch failed");
                }
                user.last_activity = now;
                user
            }
            Ok(None) => {
                let user = Self::synthesize_user(msg, &now);
                if let Err(e) = self.storage.insert_user(&user).await {
                    warn!(tg_id = msg.sender_id, error = %e, "user insert failed; continuing");
                }
                user
            }
            Err(e) => {
                warn!(tg_id = msg.sender_id, error = %e, "user lookup failed; synthesizing");
                Self::synthesize_user(msg, &now)
            }
        }
    }

    /// Append one turn to the conversation log. Failures are logged and
    /// swallowed; the relay continues without the record.
    pub async fn append_message(
        &self,
        tg_id: i64,
        role: Role,
        content: &str,
        metadata: Option<String>,
    ) {
        let dialog = Dialog {
            id: 0,
            session_id: Self::session_token(tg_id),
            tg_id,
            timestamp: now_rfc3339(),
            role,
            content: content.to_string(),
            metadata,
        };
        if let Err(e) = self.storage.insert_dialog(&dialog).await {
            warn!(tg_id, error = %e, "dialog append failed; continuing");
        }
    }

    /// The `limit` newest turns for one user, returned in chronological
    /// order. A storage fault yields an empty history.
    pub async fn recent_messages(&self, tg_id: i64, limit: i64) -> Vec<Dialog> {
        match self.storage.recent_dialogs(tg_id, limit).await {
            Ok(mut rows) => {
                rows.reverse();
                rows
            }
            Err(e) => {
                warn!(tg_id, error = %e, "history read failed; empty context");
                Vec::new()
            }
        }
    }

    // --- Admin surface (fallible pass-throughs) ---

    pub async fn counts(&self) -> Result<TableCounts, MurmurError> {
        self.storage.counts().await
    }

    pub async fn list_users(&self, limit: i64) -> Result<Vec<User>, MurmurError> {
        self.storage.list_users(limit).await
    }

    pub async fn list_dialogs(&self, page: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError> {
        self.storage.list_dialogs(page, limit).await
    }

    pub async fn dialogs_for_user(&self, tg_id: i64) -> Result<Vec<Dialog>, MurmurError> {
        self.storage.dialogs_for_user(tg_id).await
    }

    pub async fn raw_query(&self, sql: &str) -> Result<Vec<serde_json::Value>, MurmurError> {
        self.storage.raw_query(sql).await
    }

    pub async fn list_assistants(&self) -> Result<Vec<AssistantProfile>, MurmurError> {
        self.storage.list_assistants().await
    }

    pub async fn create_assistant(
        &self,
        fields: &NewAssistant,
    ) -> Result<AssistantProfile, MurmurError> {
        self.ensure_writable()?;
        self.storage.create_assistant(fields).await
    }

    pub async fn update_assistant(
        &self,
        id: &str,
        patch: &AssistantPatch,
    ) -> Result<Option<AssistantProfile>, MurmurError> {
        self.ensure_writable()?;
        self.storage.update_assistant(id, patch).await
    }

    pub async fn delete_assistant(&self, id: &str) -> Result<bool, MurmurError> {
        self.ensure_writable()?;
        self.storage.delete_assistant(id).await
    }

    fn ensure_writable(&self) -> Result<(), MurmurError> {
        if self.is_degraded() {
            return Err(MurmurError::Storage {
                source: "storage unavailable".into(),
            });
        }
        Ok(())
    }
}
