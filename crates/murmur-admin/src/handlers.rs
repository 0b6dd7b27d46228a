// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the admin HTTP surface.
//!
//! Read endpoints pass straight through to the store; persona mutations go
//! through the gateway's writability guard; the raw-query endpoint refuses
//! mutating statements before they reach SQLite. The webhook handler
//! acknowledges every delivery with 200 so Telegram never re-drives an
//! update the relay chose to skip.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use murmur_core::types::{AssistantPatch, AssistantProfile, Dialog, NewAssistant, User};
use murmur_core::MurmurError;

use crate::server::AdminState;
use crate::webhook::WebhookUpdate;

/// Statement keywords the raw-query endpoint refuses.
const BLOCKED_KEYWORDS: [&str; 5] = ["drop", "delete", "update", "insert", "alter"];

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Error payload returned by all failing endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

/// Acknowledgement for `POST /webhook`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Response for `GET /api/admin/stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: i64,
    pub dialogs: i64,
    pub assistants: i64,
    /// RFC 3339 time the stats were read.
    pub timestamp: String,
}

/// Response for `GET /api/admin/users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// Pagination parameters for the dialog listing.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    50
}

/// Response for the dialog listing endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct DialogsResponse {
    pub dialogs: Vec<Dialog>,
}

/// Response for `GET /api/admin/assistants`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssistantsResponse {
    pub assistants: Vec<AssistantProfile>,
}

/// Request body for `POST /api/admin/query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Response for `POST /api/admin/query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub rows: Vec<serde_json::Value>,
}

fn internal_error(e: MurmurError) -> ApiError {
    warn!(error = %e, "admin request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn not_found(what: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{what} not found"),
        }),
    )
}

/// Checks whether the statement's leading keyword is a mutating one.
///
/// Leading whitespace and case are ignored. This is a guard rail for an
/// operator console, not an SQL firewall.
pub(crate) fn is_blocked_query(sql: &str) -> bool {
    let keyword = sql
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    BLOCKED_KEYWORDS.contains(&keyword.as_str())
}

/// `GET /health`
pub async fn health(State(state): State<AdminState>) -> Json<HealthResponse> {
    let storage = if state.gateway.is_degraded() {
        "degraded"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.to_string(),
    })
}

/// `POST /webhook`
///
/// Always returns 200: a malformed body, a non-private chat, or a full
/// intake queue are all logged and acknowledged so Telegram does not
/// retry the same update indefinitely.
pub async fn receive_webhook(State(state): State<AdminState>, body: Bytes) -> Json<WebhookAck> {
    match serde_json::from_slice::<WebhookUpdate>(&body) {
        Ok(update) => {
            if let Some(inbound) = update.into_inbound() {
                debug!(chat_id = inbound.chat_id, "webhook update accepted");
                if let Err(e) = state.inbound_tx.send(inbound).await {
                    warn!(error = %e, "webhook intake queue closed; update dropped");
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "unparseable webhook body ignored");
        }
    }
    Json(WebhookAck { ok: true })
}

/// `GET /api/admin/stats`
pub async fn get_stats(
    State(state): State<AdminState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let counts = state.gateway.counts().await.map_err(internal_error)?;
    Ok(Json(StatsResponse {
        users: counts.users,
        dialogs: counts.dialogs,
        assistants: counts.assistants,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/admin/users`
///
/// The 100 most recently created users.
pub async fn list_users(State(state): State<AdminState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state
        .gateway
        .list_users(100)
        .await
        .map_err(internal_error)?;
    Ok(Json(UsersResponse { users }))
}

/// `GET /api/admin/dialogs?page=&limit=`
pub async fn list_dialogs(
    State(state): State<AdminState>,
    Query(params): Query<PageParams>,
) -> Result<Json<DialogsResponse>, ApiError> {
    let dialogs = state
        .gateway
        .list_dialogs(params.page, params.limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(DialogsResponse { dialogs }))
}

/// `GET /api/admin/dialogs/{tg_id}`
pub async fn user_dialogs(
    State(state): State<AdminState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<DialogsResponse>, ApiError> {
    let dialogs = state
        .gateway
        .dialogs_for_user(tg_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(DialogsResponse { dialogs }))
}

/// `GET /api/admin/assistants`
pub async fn list_assistants(
    State(state): State<AdminState>,
) -> Result<Json<AssistantsResponse>, ApiError> {
    let assistants = state
        .gateway
        .list_assistants()
        .await
        .map_err(internal_error)?;
    Ok(Json(AssistantsResponse { assistants }))
}

/// `POST /api/admin/assistants`
pub async fn create_assistant(
    State(state): State<AdminState>,
    Json(fields): Json<NewAssistant>,
) -> Result<(StatusCode, Json<AssistantProfile>), ApiError> {
    let profile = state
        .gateway
        .create_assistant(&fields)
        .await
        .map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `PUT /api/admin/assistants/{id}`
pub async fn update_assistant(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(patch): Json<AssistantPatch>,
) -> Result<Json<AssistantProfile>, ApiError> {
    match state.gateway.update_assistant(&id, &patch).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(not_found("assistant")),
        Err(e) => Err(internal_error(e)),
    }
}

/// `DELETE /api/admin/assistants/{id}`
pub async fn delete_assistant(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.gateway.delete_assistant(&id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found("assistant")),
        Err(e) => Err(internal_error(e)),
    }
}

/// `POST /api/admin/query`
///
/// Executes one read statement and returns its rows as JSON objects.
/// Statements whose leading keyword mutates data are rejected with 400
/// before reaching the database.
pub async fn run_query(
    State(state): State<AdminState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let sql = req.query.trim();
    if sql.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "empty query".to_string(),
            }),
        ));
    }
    if is_blocked_query(sql) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "mutating statements are not allowed".to_string(),
            }),
        ));
    }

    let rows = state.gateway.raw_query(sql).await.map_err(internal_error)?;
    Ok(Json(QueryResponse { rows }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use murmur_config::model::StorageConfig;
    use murmur_core::types::Role;
    use murmur_core::StorageAdapter;
    use murmur_storage::{SqliteStorage, StoreGateway};
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    async fn make_state(dir: &tempfile::TempDir) -> (AdminState, mpsc::Receiver<murmur_core::types::InboundMessage>) {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("admin.db").to_str().unwrap().to_string(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let gateway = Arc::new(StoreGateway::connect(Arc::new(storage)).await);
        let (tx, rx) = mpsc::channel(8);
        (AdminState::new(gateway, tx), rx)
    }

    #[test]
    fn blocked_query_guard_rejects_mutating_keywords() {
        for sql in [
            "DROP TABLE users",
            "delete from dialogs",
            "  UPDATE users SET is_blocked = 1",
            "\n\tInsert into users values (1)",
            "alter table users add column x",
        ] {
            assert!(is_blocked_query(sql.trim()), "should block: {sql}");
        }
    }

    #[test]
    fn blocked_query_guard_accepts_reads() {
        for sql in [
            "SELECT * FROM users",
            "select count(*) from dialogs",
            "  PRAGMA table_info(users)",
            "explain query plan select 1",
        ] {
            assert!(!is_blocked_query(sql.trim()), "should allow: {sql}");
        }
    }

    #[test]
    fn query_request_deserializes() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"query": "select 1"}"#).unwrap();
        assert_eq!(req.query, "select 1");
    }

    #[test]
    fn page_params_default_when_absent() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 50);
    }

    #[tokio::test]
    async fn health_reports_storage_state() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;
        let Json(resp) = health(State(state)).await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.storage, "ok");
    }

    #[tokio::test]
    async fn webhook_acks_malformed_body() {
        let dir = tempdir().unwrap();
        let (state, mut rx) = make_state(&dir).await;

        let Json(ack) =
            receive_webhook(State(state), Bytes::from_static(b"not json at all")).await;
        assert!(ack.ok);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn webhook_forwards_private_text_update() {
        let dir = tempdir().unwrap();
        let (state, mut rx) = make_state(&dir).await;

        let body = serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 3,
                "date": 1700000000i64,
                "chat": {"id": 9, "type": "private"},
                "from": {"id": 9, "is_bot": false, "first_name": "Ada"},
                "text": "via webhook"
            }
        });
        let Json(ack) = receive_webhook(
            State(state),
            Bytes::from(serde_json::to_vec(&body).unwrap()),
        )
        .await;
        assert!(ack.ok);

        let inbound = rx.try_recv().unwrap();
        assert_eq!(inbound.sender_id, 9);
    }

    #[tokio::test]
    async fn stats_counts_seeded_rows() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;
        state
            .gateway
            .append_message(1, Role::User, "hi", None)
            .await;

        let Json(resp) = get_stats(State(state)).await.unwrap();
        assert_eq!(resp.dialogs, 1);
        assert_eq!(resp.users, 0);
    }

    #[tokio::test]
    async fn assistant_update_missing_id_is_404() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;

        let err = update_assistant(
            State(state),
            Path("no-such-id".to_string()),
            Json(AssistantPatch::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assistant_crud_round_trip() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;

        let fields: NewAssistant = serde_json::from_value(serde_json::json!({
            "name": "Support",
            "system_prompt": "Be kind."
        }))
        .unwrap();
        let (status, Json(created)) =
            create_assistant(State(state.clone()), Json(fields)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.r#type, "ai");
        assert!(created.is_active);

        let patch: AssistantPatch =
            serde_json::from_value(serde_json::json!({"name": "Sales"})).unwrap();
        let Json(updated) = update_assistant(
            State(state.clone()),
            Path(created.id.clone()),
            Json(patch),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Sales");
        assert_eq!(updated.system_prompt, "Be kind.");

        let status = delete_assistant(State(state.clone()), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_assistant(State(state), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn run_query_executes_select() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;
        state
            .gateway
            .append_message(5, Role::User, "row", None)
            .await;

        let Json(resp) = run_query(
            State(state),
            Json(QueryRequest {
                query: "select tg_id, content from dialogs".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(resp.rows[0]["tg_id"], 5);
        assert_eq!(resp.rows[0]["content"], "row");
    }

    #[tokio::test]
    async fn run_query_rejects_mutations() {
        let dir = tempdir().unwrap();
        let (state, _rx) = make_state(&dir).await;

        let err = run_query(
            State(state),
            Json(QueryRequest {
                query: "DELETE FROM dialogs".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
