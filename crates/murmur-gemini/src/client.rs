// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Handles request construction, authentication, and typed error
//! classification from the structured `error.status` field.

use std::time::Duration;

use murmur_core::types::{ProviderErrorKind, ProviderRequest, ProviderResponse};
use murmur_core::MurmurError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Base URL for the Gemini API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client authenticating via the
    /// `x-goog-api-key` header.
    pub fn new(api_key: &str, model: String) -> Result<Self, MurmurError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| MurmurError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MurmurError::Provider {
                kind: ProviderErrorKind::Configuration,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            model,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one generation request and returns the first candidate's text.
    pub async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, MurmurError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest::from_provider_request(request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MurmurError::Provider {
                kind: ProviderErrorKind::Transient,
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        let text = response.text().await.map_err(|e| MurmurError::Provider {
            kind: ProviderErrorKind::Transient,
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(classify_error(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| MurmurError::Provider {
                kind: ProviderErrorKind::Transient,
                message: format!("malformed response body: {e}"),
            })?;

        let reply = parsed.first_text().ok_or_else(|| MurmurError::Provider {
            kind: ProviderErrorKind::Transient,
            message: "response carried no candidates".to_string(),
        })?;

        Ok(ProviderResponse { text: reply })
    }
}

/// Classify an API error from its structured status, not from message
/// substrings. Unknown statuses and unparseable bodies are transient.
fn classify_error(http_status: reqwest::StatusCode, body: &str) -> MurmurError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();

    let kind = match &parsed {
        Some(envelope) => {
            let api = &envelope.error;
            if api.has_reason("API_KEY_INVALID")
                || api.status == "UNAUTHENTICATED"
                || api.status == "PERMISSION_DENIED"
            {
                ProviderErrorKind::Configuration
            } else if api.status == "RESOURCE_EXHAUSTED" {
                ProviderErrorKind::RateLimited
            } else {
                ProviderErrorKind::Transient
            }
        }
        None if http_status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
            ProviderErrorKind::RateLimited
        }
        None if http_status == reqwest::StatusCode::UNAUTHORIZED
            || http_status == reqwest::StatusCode::FORBIDDEN =>
        {
            ProviderErrorKind::Configuration
        }
        None => ProviderErrorKind::Transient,
    };

    let message = parsed
        .map(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("API returned {http_status}"));

    MurmurError::Provider { kind, message }
}
