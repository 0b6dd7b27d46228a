// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each accepts `&Database` and runs through the
//! single background writer thread.

pub mod assistants;
pub mod dialogs;
pub mod users;

use murmur_core::types::Role;

/// Decode a `role` column, surfacing bad values as a conversion failure on
/// the given column index.
pub(crate) fn role_from_sql(idx: usize, raw: String) -> Result<Role, rusqlite::Error> {
    raw.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
