// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant persona CRUD operations.

use murmur_core::MurmurError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::{map_tr_err, Database};
use crate::models::{now_rfc3339, AssistantPatch, AssistantProfile, NewAssistant};

const ASSISTANT_COLUMNS: &str = "id, name, type, system_prompt, tov_snippet, handoff_rules, \
                                 is_active, created_at, updated_at";

fn row_to_assistant(row: &rusqlite::Row<'_>) -> Result<AssistantProfile, rusqlite::Error> {
    Ok(AssistantProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        r#type: row.get(2)?,
        system_prompt: row.get(3)?,
        tov_snippet: row.get(4)?,
        handoff_rules: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// All personas, newest first.
pub async fn list_assistants(db: &Database) -> Result<Vec<AssistantProfile>, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<Vec<AssistantProfile>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSISTANT_COLUMNS} FROM assistants ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], row_to_assistant)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new persona with a generated UUID and timestamps, returning the
/// stored row.
pub async fn create_assistant(
    db: &Database,
    fields: &NewAssistant,
) -> Result<AssistantProfile, MurmurError> {
    let now = now_rfc3339();
    let profile = AssistantProfile {
        id: Uuid::new_v4().to_string(),
        name: fields.name.clone(),
        r#type: fields.r#type.clone(),
        system_prompt: fields.system_prompt.clone(),
        tov_snippet: fields.tov_snippet.clone(),
        handoff_rules: fields.handoff_rules.clone(),
        is_active: fields.is_active,
        created_at: now.clone(),
        updated_at: now,
    };

    let row = profile.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO assistants ({ASSISTANT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    row.id,
                    row.name,
                    row.r#type,
                    row.system_prompt,
                    row.tov_snippet,
                    row.handoff_rules,
                    row.is_active,
                    row.created_at,
                    row.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(profile)
}

/// Apply a partial update, returning the row after the change or `None`
/// when the id is unknown. Read and write happen in one transaction on the
/// writer thread.
pub async fn update_assistant(
    db: &Database,
    id: &str,
    patch: &AssistantPatch,
) -> Result<Option<AssistantProfile>, MurmurError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| -> Result<Option<AssistantProfile>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ASSISTANT_COLUMNS} FROM assistants WHERE id = ?1"
                ))?;
                let mut rows = stmt.query_map(params![id], row_to_assistant)?;
                match rows.next().transpose()? {
                    Some(row) => row,
                    None => return Ok(None),
                }
            };

            let updated = AssistantProfile {
                id: existing.id,
                name: patch.name.unwrap_or(existing.name),
                r#type: patch.r#type.unwrap_or(existing.r#type),
                system_prompt: patch.system_prompt.unwrap_or(existing.system_prompt),
                tov_snippet: patch.tov_snippet.or(existing.tov_snippet),
                handoff_rules: patch.handoff_rules.or(existing.handoff_rules),
                is_active: patch.is_active.unwrap_or(existing.is_active),
                created_at: existing.created_at,
                updated_at: crate::models::now_rfc3339(),
            };

            tx.execute(
                "UPDATE assistants
                 SET name = ?2, type = ?3, system_prompt = ?4, tov_snippet = ?5,
                     handoff_rules = ?6, is_active = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    updated.id,
                    updated.name,
                    updated.r#type,
                    updated.system_prompt,
                    updated.tov_snippet,
                    updated.handoff_rules,
                    updated.is_active,
                    updated.updated_at,
                ],
            )?;
            tx.commit()?;
            Ok(Some(updated))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one persona, reporting whether a row existed.
pub async fn delete_assistant(db: &Database, id: &str) -> Result<bool, MurmurError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let affected = conn.execute("DELETE FROM assistants WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(map_tr_err)
}
