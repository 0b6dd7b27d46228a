// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server startup for the admin surface.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::info;

use murmur_config::model::AdminConfig;
use murmur_core::types::InboundMessage;
use murmur_core::MurmurError;
use murmur_storage::StoreGateway;

use crate::handlers;

/// Shared state handed to every admin handler.
#[derive(Clone)]
pub struct AdminState {
    /// Storage seam; also carries the degraded-store mutation guard.
    pub gateway: Arc<StoreGateway>,
    /// Intake queue feeding the relay loop, used by the webhook endpoint.
    pub inbound_tx: mpsc::Sender<InboundMessage>,
}

impl AdminState {
    pub fn new(gateway: Arc<StoreGateway>, inbound_tx: mpsc::Sender<InboundMessage>) -> Self {
        Self {
            gateway,
            inbound_tx,
        }
    }
}

/// Builds the full admin router.
///
/// CORS is permissive: the surface is expected to sit behind operator-side
/// access control, not to provide its own.
pub fn build_router(state: AdminState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook", post(handlers::receive_webhook));

    let api = Router::new()
        .route("/api/admin/stats", get(handlers::get_stats))
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/dialogs", get(handlers::list_dialogs))
        .route("/api/admin/dialogs/{tg_id}", get(handlers::user_dialogs))
        .route(
            "/api/admin/assistants",
            get(handlers::list_assistants).post(handlers::create_assistant),
        )
        .route(
            "/api/admin/assistants/{id}",
            put(handlers::update_assistant).delete(handlers::delete_assistant),
        )
        .route("/api/admin/query", post(handlers::run_query));

    public
        .merge(api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves the admin router until the
/// process exits.
pub async fn start_server(config: &AdminConfig, state: AdminState) -> Result<(), MurmurError> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MurmurError::Internal(format!("admin server bind failed on {addr}: {e}")))?;
    info!(%addr, "admin server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| MurmurError::Internal(format!("admin server error: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_config::model::StorageConfig;
    use murmur_core::StorageAdapter;
    use murmur_storage::SqliteStorage;
    use tempfile::tempdir;

    #[tokio::test]
    async fn router_builds_with_live_state() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("srv.db").to_str().unwrap().to_string(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let gateway = Arc::new(StoreGateway::connect(Arc::new(storage)).await);
        let (tx, _rx) = mpsc::channel(8);

        let _router = build_router(AdminState::new(gateway, tx));
    }
}
