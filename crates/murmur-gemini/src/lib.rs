// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Murmur relay.
//!
//! Wraps the `generateContent` REST endpoint behind the
//! [`ProviderAdapter`] trait. Errors reach callers already classified as
//! configuration, rate-limit, or transient faults.

pub mod client;
pub mod types;

use async_trait::async_trait;

use murmur_config::model::GeminiConfig;
use murmur_core::types::{ProviderRequest, ProviderResponse};
use murmur_core::{AdapterType, HealthStatus, MurmurError, PluginAdapter, ProviderAdapter};

pub use client::GeminiClient;

/// Gemini-backed provider adapter.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Build the provider from configuration. Fails when no API key is
    /// configured.
    pub fn new(config: &GeminiConfig) -> Result<Self, MurmurError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| MurmurError::Config("gemini.api_key is not set".to_string()))?;
        let client = GeminiClient::new(api_key, config.model.clone())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        // A generation call costs quota, so health is reported from local
        // state only.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MurmurError> {
        self.client.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_api_key() {
        let config = GeminiConfig::default();
        assert!(matches!(
            GeminiProvider::new(&config),
            Err(MurmurError::Config(_))
        ));
    }

    #[test]
    fn adapter_metadata() {
        let config = GeminiConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let provider = GeminiProvider::new(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
        assert_eq!(provider.client.model(), "gemini-2.0-flash-exp");
    }
}
