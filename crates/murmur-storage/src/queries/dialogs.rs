// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialog log operations. The log is append-only in the relay path;
//! recency is always `ORDER BY id`, which doubles as the insertion-order
//! tiebreak for rows sharing a timestamp.

use murmur_core::MurmurError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::Dialog;
use crate::queries::role_from_sql;

const DIALOG_COLUMNS: &str = "id, session_id, tg_id, timestamp, role, content, metadata";

fn row_to_dialog(row: &rusqlite::Row<'_>) -> Result<Dialog, rusqlite::Error> {
    Ok(Dialog {
        id: row.get(0)?,
        session_id: row.get(1)?,
        tg_id: row.get(2)?,
        timestamp: row.get(3)?,
        role: role_from_sql(4, row.get(4)?)?,
        content: row.get(5)?,
        metadata: row.get(6)?,
    })
}

/// Append one dialog row. The `id` field of the argument is ignored; SQLite
/// assigns the rowid.
pub async fn insert_dialog(db: &Database, dialog: &Dialog) -> Result<(), MurmurError> {
    let dialog = dialog.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO dialogs (session_id, tg_id, timestamp, role, content, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    dialog.session_id,
                    dialog.tg_id,
                    dialog.timestamp,
                    dialog.role.to_string(),
                    dialog.content,
                    dialog.metadata,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` newest rows for one user, id descending.
pub async fn recent_dialogs(
    db: &Database,
    tg_id: i64,
    limit: i64,
) -> Result<Vec<Dialog>, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Dialog>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DIALOG_COLUMNS} FROM dialogs
                 WHERE tg_id = ?1 ORDER BY id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![tg_id, limit], row_to_dialog)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// All rows for one user in chronological order.
pub async fn dialogs_for_user(db: &Database, tg_id: i64) -> Result<Vec<Dialog>, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Dialog>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DIALOG_COLUMNS} FROM dialogs WHERE tg_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![tg_id], row_to_dialog)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Global dialog log, newest first, paginated (1-based page).
pub async fn list_dialogs(db: &Database, page: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError> {
    let offset = (page.max(1) - 1) * limit;
    db.connection()
        .call(move |conn| -> Result<Vec<Dialog>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DIALOG_COLUMNS} FROM dialogs ORDER BY id DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset], row_to_dialog)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
