// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with a FIFO script of
//! replies and classified failures, and records every request so tests can
//! assert on the assembled context.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use murmur_core::traits::{PluginAdapter, ProviderAdapter};
use murmur_core::types::{
    AdapterType, HealthStatus, ProviderErrorKind, ProviderRequest, ProviderResponse,
};
use murmur_core::MurmurError;

/// A mock provider that replays a script of outcomes.
///
/// Outcomes are popped from a FIFO queue; an exhausted queue yields a
/// default "mock response" text. `Err` entries surface as classified
/// provider errors, which is how tests drive the apology paths.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Result<String, ProviderErrorKind>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-load successful replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a classified failure.
    pub async fn add_failure(&self, kind: ProviderErrorKind) {
        self.script.lock().await.push_back(Err(kind));
    }

    /// Every request seen so far, in call order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MurmurError> {
        self.requests.lock().await.push(request);

        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()));

        match outcome {
            Ok(text) => Ok(ProviderResponse { text }),
            Err(kind) => Err(MurmurError::Provider {
                kind,
                message: format!("scripted {kind} failure"),
            }),
        }
    }
}
