// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use murmur_core::MurmurError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::User;

const USER_COLUMNS: &str =
    "tg_id, full_name, fio, phone, city, adress, is_blocked, last_activity, created_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        tg_id: row.get(0)?,
        full_name: row.get(1)?,
        fio: row.get(2)?,
        phone: row.get(3)?,
        city: row.get(4)?,
        adress: row.get(5)?,
        is_blocked: row.get(6)?,
        last_activity: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Look up one user by Telegram id.
pub async fn get_user(db: &Database, tg_id: i64) -> Result<Option<User>, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE tg_id = ?1"
            ))?;
            let mut rows = stmt.query_map(params![tg_id], row_to_user)?;
            rows.next().transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new user row.
pub async fn insert_user(db: &Database, user: &User) -> Result<(), MurmurError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO users ({USER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    user.tg_id,
                    user.full_name,
                    user.fio,
                    user.phone,
                    user.city,
                    user.adress,
                    user.is_blocked,
                    user.last_activity,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Refresh a user's last-activity timestamp.
pub async fn touch_user(db: &Database, tg_id: i64, last_activity: &str) -> Result<(), MurmurError> {
    let last_activity = last_activity.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE users SET last_activity = ?1 WHERE tg_id = ?2",
                params![last_activity, tg_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest users first, bounded.
pub async fn list_users(db: &Database, limit: i64) -> Result<Vec<User>, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<Vec<User>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_user)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
