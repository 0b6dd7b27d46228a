// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for generation calls.
//!
//! Reads the bounded recent history for one user and maps stored roles to
//! provider turn labels. Stored `system` rows never reach the provider;
//! `assistant` rows become `model` turns.

use murmur_core::types::{ContextTurn, Role, TurnRole};
use murmur_storage::StoreGateway;

/// Assemble the provider context for one user from their recent history.
///
/// Returns up to `max_turns` turns in chronological order. Read-only: the
/// current inbound message is not part of the result. An empty or
/// unavailable history yields an empty vec.
pub async fn assemble_context(
    gateway: &StoreGateway,
    tg_id: i64,
    max_turns: usize,
) -> Vec<ContextTurn> {
    gateway
        .recent_messages(tg_id, max_turns as i64)
        .await
        .into_iter()
        .filter_map(|dialog| {
            let role = match dialog.role {
                Role::User => TurnRole::User,
                Role::Assistant => TurnRole::Model,
                // System rows are bookkeeping, not conversation.
                Role::System => return None,
            };
            Some(ContextTurn {
                role,
                content: dialog.content,
            })
        })
        .collect()
}
