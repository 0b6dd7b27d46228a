// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use tokio::sync::OnceCell;
use tracing::debug;

use murmur_config::model::StorageConfig;
use murmur_core::types::{
    AssistantPatch, AssistantProfile, Dialog, NewAssistant, TableCounts, User,
};
use murmur_core::{AdapterType, HealthStatus, MurmurError, PluginAdapter, StorageAdapter};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, MurmurError> {
        self.db.get().ok_or_else(|| MurmurError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MurmurError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MurmurError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MurmurError> {
        self.db()?.close().await
    }

    // --- User operations ---

    async fn get_user(&self, tg_id: i64) -> Result<Option<User>, MurmurError> {
        queries::users::get_user(self.db()?, tg_id).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), MurmurError> {
        queries::users::insert_user(self.db()?, user).await
    }

    async fn touch_user(&self, tg_id: i64, last_activity: &str) -> Result<(), MurmurError> {
        queries::users::touch_user(self.db()?, tg_id, last_activity).await
    }

    async fn list_users(&self, limit: i64) -> Result<Vec<User>, MurmurError> {
        queries::users::list_users(self.db()?, limit).await
    }

    // --- Dialog operations ---

    async fn insert_dialog(&self, dialog: &Dialog) -> Result<(), MurmurError> {
        queries::dialogs::insert_dialog(self.db()?, dialog).await
    }

    async fn recent_dialogs(&self, tg_id: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError> {
        queries::dialogs::recent_dialogs(self.db()?, tg_id, limit).await
    }

    async fn dialogs_for_user(&self, tg_id: i64) -> Result<Vec<Dialog>, MurmurError> {
        queries::dialogs::dialogs_for_user(self.db()?, tg_id).await
    }

    async fn list_dialogs(&self, page: i64, limit: i64) -> Result<Vec<Dialog>, MurmurError> {
        queries::dialogs::list_dialogs(self.db()?, page, limit).await
    }

    // --- Assistant operations ---

    async fn list_assistants(&self) -> Result<Vec<AssistantProfile>, MurmurError> {
        queries::assistants::list_assistants(self.db()?).await
    }

    async fn create_assistant(
        &self,
        fields: &NewAssistant,
    ) -> Result<AssistantProfile, MurmurError> {
        queries::assistants::create_assistant(self.db()?, fields).await
    }

    async fn update_assistant(
        &self,
        id: &str,
        patch: &AssistantPatch,
    ) -> Result<Option<AssistantProfile>, MurmurError> {
        queries::assistants::update_assistant(self.db()?, id, patch).await
    }

    async fn delete_assistant(&self, id: &str) -> Result<bool, MurmurError> {
        queries::assistants::delete_assistant(self.db()?, id).await
    }

    // --- Admin operations ---

    async fn counts(&self) -> Result<TableCounts, MurmurError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<TableCounts, rusqlite::Error> {
                let users = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
                let dialogs = conn.query_row("SELECT COUNT(*) FROM dialogs", [], |r| r.get(0))?;
                let assistants =
                    conn.query_row("SELECT COUNT(*) FROM assistants", [], |r| r.get(0))?;
                Ok(TableCounts {
                    users,
                    dialogs,
                    assistants,
                })
            })
            .await
            .map_err(map_tr_err)
    }

    async fn raw_query(&self, sql: &str) -> Result<Vec<serde_json::Value>, MurmurError> {
        let sql = sql.to_string();
        self.db()?
            .connection()
            .call(move |conn| -> Result<Vec<serde_json::Value>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> =
                    stmt.column_names().iter().map(|c| c.to_string()).collect();

                let mut out = Vec::new();
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    let mut obj = serde_json::Map::with_capacity(columns.len());
                    for (i, name) in columns.iter().enumerate() {
                        let value = match row.get_ref(i)? {
                            ValueRef::Null => serde_json::Value::Null,
                            ValueRef::Integer(v) => serde_json::Value::from(v),
                            ValueRef::Real(v) => serde_json::Value::from(v),
                            ValueRef::Text(t) => {
                                serde_json::Value::from(String::from_utf8_lossy(t).into_owned())
                            }
                            ValueRef::Blob(b) => serde_json::Value::from(format!(
                                "<blob {} bytes>",
                                b.len()
                            )),
                        };
                        obj.insert(name.clone(), value);
                    }
                    out.push(serde_json::Value::Object(obj));
                }
                Ok(out)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::Role;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn open_storage(dir: &tempfile::TempDir, file: &str) -> SqliteStorage {
        let db_path = dir.path().join(file);
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        storage
    }

    fn make_user(tg_id: i64) -> User {
        User {
            tg_id,
            full_name: Some("Test User".to_string()),
            fio: None,
            phone: None,
            city: None,
            adress: None,
            is_blocked: false,
            last_activity: "2026-01-01T00:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("meta.db").to_str().unwrap(),
        ));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("uninit.db").to_str().unwrap(),
        ));
        assert!(storage.get_user(1).await.is_err());
        assert!(storage.health_check().await.is_err());
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir, "double.db").await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn counts_reflect_inserts() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir, "counts.db").await;

        let empty = storage.counts().await.unwrap();
        assert_eq!(empty.users, 0);
        assert_eq!(empty.dialogs, 0);
        assert_eq!(empty.assistants, 0);

        storage.insert_user(&make_user(1)).await.unwrap();
        storage
            .insert_dialog(&Dialog {
                id: 0,
                session_id: "1_1700000000000".to_string(),
                tg_id: 1,
                timestamp: "2026-01-01T00:00:01.000Z".to_string(),
                role: Role::User,
                content: "hello".to_string(),
                metadata: None,
            })
            .await
            .unwrap();

        let counts = storage.counts().await.unwrap();
        assert_eq!(counts.users, 1);
        assert_eq!(counts.dialogs, 1);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn raw_query_returns_json_objects() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir, "raw.db").await;
        storage.insert_user(&make_user(77)).await.unwrap();

        let rows = storage
            .raw_query("SELECT tg_id, full_name, phone FROM users")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["tg_id"], 77);
        assert_eq!(rows[0]["full_name"], "Test User");
        assert!(rows[0]["phone"].is_null());
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn raw_query_propagates_sql_errors() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir, "badsql.db").await;
        assert!(storage.raw_query("SELECT * FROM no_such_table").await.is_err());
    }

    #[tokio::test]
    async fn full_relay_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir, "lifecycle.db").await;

        storage.insert_user(&make_user(10)).await.unwrap();
        storage
            .touch_user(10, "2026-01-02T00:00:00.000Z")
            .await
            .unwrap();
        let user = storage.get_user(10).await.unwrap().unwrap();
        assert_eq!(user.last_activity, "2026-01-02T00:00:00.000Z");

        for (role, content) in [
            (Role::User, "hi"),
            (Role::Assistant, "hello!"),
            (Role::User, "how are you?"),
        ] {
            storage
                .insert_dialog(&Dialog {
                    id: 0,
                    session_id: "10_1700000000000".to_string(),
                    tg_id: 10,
                    timestamp: "2026-01-02T00:00:01.000Z".to_string(),
                    role,
                    content: content.to_string(),
                    metadata: None,
                })
                .await
                .unwrap();
        }

        let recent = storage.recent_dialogs(10, 2).await.unwrap();
        assert_eq!(recent[0].content, "how are you?");
        assert_eq!(recent[1].content, "hello!");

        let all = storage.dialogs_for_user(10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content, "hi");

        storage.shutdown().await.unwrap();
    }
}
